//! Fake collaborators for tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};

use super::collaborators::{GeneratedImage, Illustrator, Narrator, SpeechClip, StoryWriter};

/// Returns a fixed reply (or error) and counts calls
pub struct ScriptedWriter {
    reply: Result<String, String>,
    calls: AtomicUsize,
}

impl ScriptedWriter {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StoryWriter for ScriptedWriter {
    async fn write_story(&self, _system: &str, _user: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reply.clone().map_err(|e| anyhow!(e))
    }
}

/// Produces one PNG per prompt unless the prompt contains `fail_on`
pub struct FakeIllustrator {
    fail_on: Option<String>,
    empty: bool,
    calls: AtomicUsize,
}

impl FakeIllustrator {
    pub fn working() -> Self {
        Self {
            fail_on: None,
            empty: false,
            calls: AtomicUsize::new(0),
        }
    }

    /// Fail every prompt containing `needle`
    pub fn failing_on(needle: &str) -> Self {
        Self {
            fail_on: Some(needle.to_string()),
            ..Self::working()
        }
    }

    /// Fail every prompt
    pub fn down() -> Self {
        Self::failing_on("")
    }

    /// Succeed with no predictions
    pub fn empty() -> Self {
        Self {
            empty: true,
            ..Self::working()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Illustrator for FakeIllustrator {
    async fn illustrate(&self, prompt: &str) -> Result<Vec<GeneratedImage>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(needle) = &self.fail_on {
            if prompt.contains(needle.as_str()) {
                return Err(anyhow!("image service unavailable"));
            }
        }
        if self.empty {
            return Ok(vec![]);
        }
        Ok(vec![GeneratedImage {
            mime_type: "image/png".to_string(),
            data: STANDARD.encode(prompt.as_bytes()),
        }])
    }
}

/// Returns a short PCM clip at the given MIME type, or fails every call
pub struct FakeNarrator {
    mime_type: String,
    down: bool,
    calls: AtomicUsize,
}

impl FakeNarrator {
    pub fn working() -> Self {
        Self::with_mime_type("audio/L16;codec=pcm;rate=24000")
    }

    pub fn with_mime_type(mime_type: &str) -> Self {
        Self {
            mime_type: mime_type.to_string(),
            down: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn down() -> Self {
        Self {
            down: true,
            ..Self::working()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Narrator for FakeNarrator {
    async fn narrate(&self, _text: &str) -> Result<SpeechClip> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.down {
            return Err(anyhow!("speech service unavailable"));
        }
        let pcm: Vec<u8> = [0i16, 1000, -1000, 0]
            .iter()
            .flat_map(|s| s.to_le_bytes())
            .collect();
        Ok(SpeechClip {
            mime_type: self.mime_type.clone(),
            data: STANDARD.encode(pcm),
        })
    }
}

/// A fenced two-page reply, the common shape real models produce
pub const FENCED_TWO_PAGE_REPLY: &str = "```json\n{\n  \"title\": \"The Brave Dragon\",\n  \"pages\": [\n    {\"page_number\": 1, \"text\": \"Ember lived on a hill.\", \"imagePrompt\": \"a small red dragon on a green hill\"},\n    {\"page_number\": 2, \"text\": \"Ember saved the village.\", \"imagePrompt\": \"a red dragon flying over a village\"}\n  ]\n}\n```";
