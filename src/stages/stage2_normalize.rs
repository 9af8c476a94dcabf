use serde_json::{Map, Value};

use crate::error::StoryError;
use crate::models::{PageDraft, StoryDocument, DEFAULT_TITLE};

const MAX_PREVIEW_CHARS: usize = 1000;
const ELLIPSIS: &str = "...";

/// Configuration for Stage 2
#[derive(Debug, Clone)]
pub struct NormalizeConfig {
    /// Characters of page text used as the illustration prompt when the model gives none
    pub image_prompt_fallback_chars: usize,
    /// Characters of raw output kept in a malformed-output error (at most 1000)
    pub error_preview_chars: usize,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            image_prompt_fallback_chars: 200,
            error_preview_chars: 500,
        }
    }
}

/// Execute Stage 2: coerce a free-form model reply into a StoryDocument
///
/// Pure function. Parsing is two-tier:
/// 1. Strip surrounding code fences and parse the remainder strictly
/// 2. Otherwise parse the span from the first `{` to the last `}`
pub fn normalize(raw: &str, config: &NormalizeConfig) -> Result<StoryDocument, StoryError> {
    let object = parse_json_object(raw).map_err(|reason| malformed(raw, reason, config))?;
    build_document(object, config).map_err(|reason| malformed(raw, reason, config))
}

/// Remove one pair of markdown code fences, with or without a language tag
pub fn strip_code_fences(raw: &str) -> &str {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix("```") {
        text = match rest.split_once('\n') {
            Some((tag, body)) if is_language_tag(tag) => body,
            _ => rest,
        };
    }

    let text = text.trim_end();
    text.strip_suffix("```").unwrap_or(text).trim()
}

fn is_language_tag(tag: &str) -> bool {
    tag.trim()
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn parse_json_object(raw: &str) -> Result<Map<String, Value>, String> {
    let text = strip_code_fences(raw);

    let strict_error = match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(object)) => return Ok(object),
        Ok(_) => "top-level JSON value is not an object".to_string(),
        Err(e) => e.to_string(),
    };

    let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) else {
        return Err(format!("no JSON object found ({})", strict_error));
    };
    if start >= end {
        return Err(format!("no JSON object found ({})", strict_error));
    }

    match serde_json::from_str::<Value>(&text[start..=end]) {
        Ok(Value::Object(object)) => Ok(object),
        Ok(_) => Err("extracted span is not a JSON object".to_string()),
        Err(e) => Err(format!("could not parse JSON object: {}", e)),
    }
}

fn build_document(
    object: Map<String, Value>,
    config: &NormalizeConfig,
) -> Result<StoryDocument, String> {
    let title = object
        .get("title")
        .and_then(Value::as_str)
        .filter(|t| !t.trim().is_empty())
        .unwrap_or(DEFAULT_TITLE)
        .to_string();

    let entries = object
        .get("pages")
        .and_then(Value::as_array)
        .ok_or_else(|| "reply has no \"pages\" array".to_string())?;

    let mut declared = Vec::with_capacity(entries.len());
    let mut pages = Vec::with_capacity(entries.len());

    for (index, entry) in entries.iter().enumerate() {
        let page = entry
            .as_object()
            .ok_or_else(|| format!("page at position {} is not an object", index + 1))?;

        declared.push(
            field(page, "page_number", "pageNumber")
                .and_then(Value::as_u64)
                .and_then(|n| u32::try_from(n).ok())
                .filter(|&n| n > 0),
        );

        let text = page
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let image_prompt = match field(page, "imagePrompt", "image_prompt")
            .and_then(Value::as_str)
            .filter(|p| !p.trim().is_empty())
        {
            Some(prompt) => prompt.to_string(),
            None if text.trim().is_empty() => title.clone(),
            None => truncate_chars(&text, config.image_prompt_fallback_chars),
        };

        pages.push(PageDraft {
            page_number: (index + 1) as u32,
            text,
            image_prompt,
        });
    }

    if let Some(numbers) = reliable_page_numbers(&declared) {
        for (page, number) in pages.iter_mut().zip(numbers) {
            page.page_number = number;
        }
        pages.sort_by_key(|p| p.page_number);
    }

    Ok(StoryDocument { title, pages })
}

/// Declared page numbers are trusted only when every page has one and none repeat
fn reliable_page_numbers(declared: &[Option<u32>]) -> Option<Vec<u32>> {
    let numbers: Vec<u32> = declared.iter().copied().collect::<Option<_>>()?;
    let mut unique = numbers.clone();
    unique.sort_unstable();
    unique.dedup();
    (unique.len() == numbers.len()).then_some(numbers)
}

fn field<'a>(page: &'a Map<String, Value>, name: &str, alias: &str) -> Option<&'a Value> {
    page.get(name).or_else(|| page.get(alias))
}

/// First `max` characters of `text`, never splitting a character
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((offset, _)) => text[..offset].to_string(),
        None => text.to_string(),
    }
}

fn malformed(raw: &str, reason: String, config: &NormalizeConfig) -> StoryError {
    let raw = raw.trim();
    let limit = config.error_preview_chars.min(MAX_PREVIEW_CHARS);
    if raw.chars().count() <= limit {
        return StoryError::MalformedModelOutput {
            reason,
            preview: raw.to_string(),
        };
    }

    // the ellipsis counts against the limit
    let mut preview = truncate_chars(raw, limit.saturating_sub(ELLIPSIS.len()));
    preview.push_str(ELLIPSIS);
    StoryError::MalformedModelOutput { reason, preview }
}
