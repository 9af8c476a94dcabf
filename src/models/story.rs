use serde::{Serialize, Serializer};

/// Title used when the model omits one
pub const DEFAULT_TITLE: &str = "AI Storybook";

/// One normalized page, before any assets exist
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageDraft {
    pub page_number: u32,
    pub text: String,
    /// Input for the illustration collaborator
    #[serde(rename = "imagePrompt")]
    pub image_prompt: String,
}

/// Schema-valid story produced by the normalizer.
///
/// Page order is fixed here and never re-sorted downstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoryDocument {
    pub title: String,
    pub pages: Vec<PageDraft>,
}

/// Outcome of one asset sub-step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Asset {
    /// Data URL of the generated asset
    Ready(String),
    /// Generation failed; the reason is kept for diagnostics only
    Failed(String),
}

impl Asset {
    pub fn url(&self) -> Option<&str> {
        match self {
            Asset::Ready(url) => Some(url),
            Asset::Failed(_) => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Asset::Ready(_))
    }

    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            Asset::Ready(_) => None,
            Asset::Failed(reason) => Some(reason),
        }
    }
}

/// On the wire an asset is its URL, or `null` when it failed
impl Serialize for Asset {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.url() {
            Some(url) => serializer.serialize_str(url),
            None => serializer.serialize_none(),
        }
    }
}

/// Both asset outcomes for one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageAsset {
    pub page_number: u32,
    pub image: Asset,
    pub audio: Asset,
}

impl PageAsset {
    /// Asset pair used when a page has no generated assets at all
    pub fn missing(page_number: u32) -> Self {
        let reason = "no asset was generated for this page".to_string();
        Self {
            page_number,
            image: Asset::Failed(reason.clone()),
            audio: Asset::Failed(reason),
        }
    }
}

/// A page draft merged with its assets
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoryPage {
    pub page_number: u32,
    pub text: String,
    #[serde(rename = "imagePrompt")]
    pub image_prompt: String,
    #[serde(rename = "imageUrl")]
    pub image: Asset,
    #[serde(rename = "audioUrl")]
    pub audio: Asset,
}

/// Final aggregate returned to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoryResult {
    pub title: String,
    pub pages: Vec<StoryPage>,
}

impl StoryResult {
    /// Number of pages whose illustration failed
    pub fn illustrations_failed(&self) -> usize {
        self.pages.iter().filter(|p| !p.image.is_ready()).count()
    }

    /// Number of pages whose narration failed
    pub fn narrations_failed(&self) -> usize {
        self.pages.iter().filter(|p| !p.audio.is_ready()).count()
    }
}
