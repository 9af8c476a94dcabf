pub mod request;
pub mod story;

pub use request::*;
pub use story::*;
