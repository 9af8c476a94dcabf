pub mod stage1_request;
pub mod stage2_normalize;
pub mod stage3_assets;
pub mod stage4_assemble;

pub use stage1_request::*;
pub use stage2_normalize::*;
pub use stage3_assets::*;
pub use stage4_assemble::*;
