use serde::Deserialize;
use serde_json::Value;

use crate::error::StoryError;

/// Limits applied when validating an incoming story request
#[derive(Debug, Clone)]
pub struct RequestLimits {
    /// Page count used when the request does not name one
    pub default_page_count: u32,
    /// Largest page count a single request may ask for
    pub max_page_count: u32,
}

impl Default for RequestLimits {
    fn default() -> Self {
        Self {
            default_page_count: 3,
            max_page_count: 10,
        }
    }
}

/// A validated request for one storybook
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryRequest {
    /// User prompt, trimmed and non-empty
    pub prompt: String,
    /// Number of pages to ask the model for (>= 1)
    pub page_count: u32,
}

/// Raw inbound body; fields stay loosely typed so validation can report what was wrong
#[derive(Debug, Default, Deserialize)]
struct StoryRequestBody {
    #[serde(default)]
    prompt: Option<Value>,
    #[serde(default, rename = "pageCount", alias = "page_count")]
    page_count: Option<Value>,
}

impl StoryRequest {
    /// Validate a prompt and page count
    pub fn new(prompt: &str, page_count: u32, limits: &RequestLimits) -> Result<Self, StoryError> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(StoryError::InvalidRequest(
                "prompt is required and must be a non-empty string".to_string(),
            ));
        }
        if page_count == 0 || page_count > limits.max_page_count {
            return Err(page_count_error(limits));
        }

        Ok(Self {
            prompt: prompt.to_string(),
            page_count,
        })
    }

    /// Parse and validate a JSON request body
    pub fn from_json(body: &[u8], limits: &RequestLimits) -> Result<Self, StoryError> {
        let body: StoryRequestBody = serde_json::from_slice(body).map_err(|e| {
            StoryError::InvalidRequest(format!("request body must be a JSON object: {}", e))
        })?;

        let prompt = match body.prompt {
            Some(Value::String(prompt)) => prompt,
            _ => {
                return Err(StoryError::InvalidRequest(
                    "prompt is required and must be a non-empty string".to_string(),
                ));
            }
        };

        let page_count = match body.page_count {
            None | Some(Value::Null) => limits.default_page_count,
            Some(Value::Number(n)) => whole_number(&n).ok_or_else(|| page_count_error(limits))?,
            Some(_) => return Err(page_count_error(limits)),
        };

        Self::new(&prompt, page_count, limits)
    }
}

/// Integral JSON numbers, including floats such as `2.0`
fn whole_number(n: &serde_json::Number) -> Option<u32> {
    if let Some(n) = n.as_u64() {
        return u32::try_from(n).ok();
    }
    n.as_f64()
        .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f <= u32::MAX as f64)
        .map(|f| f as u32)
}

fn page_count_error(limits: &RequestLimits) -> StoryError {
    StoryError::InvalidRequest(format!(
        "pageCount must be an integer between 1 and {}",
        limits.max_page_count
    ))
}
