pub mod client;
pub mod collaborators;
pub mod prompts;
#[cfg(test)]
pub mod testing;

pub use client::*;
pub use collaborators::*;
pub use prompts::*;
