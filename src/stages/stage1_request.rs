use tracing::{debug, info};

use crate::error::StoryError;
use crate::llm::{build_story_prompt, StoryWriter, SYSTEM_PROMPT};

/// Execute Stage 1: ask the text collaborator for a JSON-shaped story
///
/// Calls the collaborator exactly once. Any collaborator failure is fatal
/// for the request and is returned as [`StoryError::UpstreamCall`].
pub async fn request_story(
    writer: &dyn StoryWriter,
    prompt: &str,
    page_count: u32,
) -> Result<String, StoryError> {
    let user = build_story_prompt(prompt, page_count);

    info!("Stage 1: requesting a {}-page story", page_count);
    let reply = writer
        .write_story(SYSTEM_PROMPT, &user)
        .await
        .map_err(|e| StoryError::UpstreamCall(format!("{:#}", e)))?;
    debug!("Stage 1: received {} characters", reply.len());

    Ok(reply)
}
