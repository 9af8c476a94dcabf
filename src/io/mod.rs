pub mod output;
pub mod wav;

pub use output::*;
