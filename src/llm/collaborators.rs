use anyhow::Result;
use async_trait::async_trait;

/// One raster image returned by the image-generation collaborator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    /// Media type, e.g. `image/png`
    pub mime_type: String,
    /// Base64-encoded image bytes
    pub data: String,
}

impl GeneratedImage {
    /// Render as a `data:` URL
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

/// Raw speech returned by the text-to-speech collaborator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechClip {
    /// MIME type with parameters, e.g. `audio/L16;codec=pcm;rate=24000`
    pub mime_type: String,
    /// Base64-encoded 16-bit little-endian PCM
    pub data: String,
}

/// Text-generation collaborator
#[async_trait]
pub trait StoryWriter: Send + Sync {
    /// Return the model's free-form reply to a system + user instruction pair
    async fn write_story(&self, system: &str, user: &str) -> Result<String>;
}

/// Image-generation collaborator
#[async_trait]
pub trait Illustrator: Send + Sync {
    /// Request a single sample; zero images is a valid (empty) answer
    async fn illustrate(&self, prompt: &str) -> Result<Vec<GeneratedImage>>;
}

/// Text-to-speech collaborator
#[async_trait]
pub trait Narrator: Send + Sync {
    async fn narrate(&self, text: &str) -> Result<SpeechClip>;
}
