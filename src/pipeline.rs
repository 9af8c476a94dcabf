use std::sync::Arc;

use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::error::StoryError;
use crate::llm::{GeminiClient, Illustrator, Narrator, StoryWriter};
use crate::models::{RequestLimits, StoryRequest, StoryResult};
use crate::stages::{assemble, generate_assets, normalize, request_story, NormalizeConfig};

/// Configuration for the whole pipeline
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    pub limits: RequestLimits,
    pub normalize: NormalizeConfig,
}

/// Runs the four stages in order against injected collaborators
pub struct StoryPipeline {
    writer: Arc<dyn StoryWriter>,
    illustrator: Arc<dyn Illustrator>,
    narrator: Arc<dyn Narrator>,
    config: PipelineConfig,
}

impl StoryPipeline {
    pub fn new(
        writer: Arc<dyn StoryWriter>,
        illustrator: Arc<dyn Illustrator>,
        narrator: Arc<dyn Narrator>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            writer,
            illustrator,
            narrator,
            config,
        }
    }

    /// Use one Gemini client for all three collaborators
    pub fn with_gemini(client: GeminiClient, config: PipelineConfig) -> Self {
        let client = Arc::new(client);
        Self::new(client.clone(), client.clone(), client, config)
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Generate one storybook
    ///
    /// Only stages 1 and 2 can fail; asset failures are reported per page.
    pub async fn generate(
        &self,
        request: &StoryRequest,
        request_id: Uuid,
    ) -> Result<StoryResult, StoryError> {
        let span = info_span!("story", %request_id);
        self.run(request).instrument(span).await
    }

    async fn run(&self, request: &StoryRequest) -> Result<StoryResult, StoryError> {
        info!("Generating {}-page story", request.page_count);

        let raw = request_story(self.writer.as_ref(), &request.prompt, request.page_count).await?;

        info!("Stage 2: normalizing model reply...");
        let doc = normalize(&raw, &self.config.normalize)?;
        if doc.pages.len() != request.page_count as usize {
            warn!(
                "Model returned {} pages, {} requested; passing through",
                doc.pages.len(),
                request.page_count
            );
        }

        let assets =
            generate_assets(self.illustrator.as_ref(), self.narrator.as_ref(), &doc.pages).await;

        Ok(assemble(doc, assets))
    }
}
