use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::models::{Asset, StoryRequest, StoryResult};

/// Machine-readable story file written by `storybook generate`
#[derive(Debug, Clone, Serialize)]
pub struct StoryFile<'a> {
    pub story: &'a StoryResult,
    pub metadata: StoryMetadata,
}

#[derive(Debug, Clone, Serialize)]
pub struct StoryMetadata {
    pub request_id: String,
    /// RFC 3339 timestamp
    pub generated_at: String,
    pub prompt: String,
    pub requested_pages: u32,
    pub returned_pages: usize,
    pub illustrations_failed: usize,
    pub narrations_failed: usize,
}

impl StoryMetadata {
    pub fn new(request_id: &str, request: &StoryRequest, story: &StoryResult) -> Self {
        Self {
            request_id: request_id.to_string(),
            generated_at: chrono::Utc::now().to_rfc3339(),
            prompt: request.prompt.clone(),
            requested_pages: request.page_count,
            returned_pages: story.pages.len(),
            illustrations_failed: story.illustrations_failed(),
            narrations_failed: story.narrations_failed(),
        }
    }
}

impl<'a> StoryFile<'a> {
    pub fn new(story: &'a StoryResult, metadata: StoryMetadata) -> Self {
        Self { story, metadata }
    }

    /// Write to a JSON file
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create file: {:?}", path))?;
        serde_json::to_writer_pretty(file, self).context("Failed to write JSON")?;
        Ok(())
    }
}

/// Human-readable rendering of a story
pub struct HumanStory<'a> {
    story: &'a StoryResult,
}

impl<'a> HumanStory<'a> {
    pub fn new(story: &'a StoryResult) -> Self {
        Self { story }
    }

    /// Format the story as plain text
    pub fn format(&self) -> String {
        let mut output = String::new();

        output.push_str(&self.story.title);
        output.push('\n');
        output.push_str(&"=".repeat(self.story.title.chars().count()));
        output.push_str("\n\n");

        for page in &self.story.pages {
            output.push_str(&format!("Page {}\n", page.page_number));
            output.push_str(&page.text);
            output.push_str("\n\n");
            output.push_str(&format!("  Illustration: {}\n", page.image_prompt));
            output.push_str(&format!("  Image: {}\n", asset_status(&page.image)));
            output.push_str(&format!("  Audio: {}\n\n", asset_status(&page.audio)));
        }

        output
    }

    /// Write to a text file
    pub fn write_file(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.format())
            .with_context(|| format!("Failed to write file: {:?}", path))
    }
}

fn asset_status(asset: &Asset) -> String {
    match asset {
        Asset::Ready(_) => "ready".to_string(),
        Asset::Failed(reason) => format!("failed ({})", reason),
    }
}
