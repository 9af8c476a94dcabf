pub mod error;
pub mod io;
pub mod llm;
pub mod models;
pub mod pipeline;
pub mod server;
pub mod stages;

pub use error::StoryError;
pub use io::{HumanStory, StoryFile, StoryMetadata};
pub use llm::{GeminiClient, GeminiConfig, Illustrator, Narrator, StoryWriter};
pub use models::{
    Asset, PageAsset, PageDraft, RequestLimits, StoryDocument, StoryPage, StoryRequest,
    StoryResult,
};
pub use pipeline::{PipelineConfig, StoryPipeline};
pub use server::{create_router, serve, StoryResponse};
pub use stages::{
    assemble, generate_assets, generate_illustration, generate_narration, normalize,
    request_story, NormalizeConfig,
};
