use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::collaborators::{GeneratedImage, Illustrator, Narrator, SpeechClip, StoryWriter};
use super::prompts::build_narration_prompt;

const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Configuration for the Gemini API client
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key (from GEMINI_API_KEY, falling back to GOOGLE_API_KEY)
    pub api_key: String,
    /// Base URL of the generative language API
    pub api_base: String,
    /// Model used for story text
    pub text_model: String,
    /// Model used for illustrations
    pub image_model: String,
    /// Model used for narration
    pub tts_model: String,
    /// Prebuilt voice name for narration
    pub voice: String,
    /// Sampling temperature for story text
    pub temperature: f64,
}

impl GeminiConfig {
    /// Create config from environment variables
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .or_else(|_| std::env::var("GOOGLE_API_KEY"))
            .context("GEMINI_API_KEY environment variable not set")?;

        let mut config = Self::new(api_key);
        if let Ok(base) = std::env::var("STORYBOOK_API_BASE") {
            config.api_base = base.trim_end_matches('/').to_string();
        }
        if let Ok(model) = std::env::var("STORYBOOK_TEXT_MODEL") {
            config.text_model = model;
        }
        if let Ok(model) = std::env::var("STORYBOOK_IMAGE_MODEL") {
            config.image_model = model;
        }
        if let Ok(model) = std::env::var("STORYBOOK_TTS_MODEL") {
            config.tts_model = model;
        }
        if let Ok(voice) = std::env::var("STORYBOOK_VOICE") {
            config.voice = voice;
        }

        Ok(config)
    }

    /// Create with default models and endpoint
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            api_base: DEFAULT_API_BASE.to_string(),
            text_model: "gemini-2.5-flash".to_string(),
            image_model: "imagen-3.0-generate-002".to_string(),
            tts_model: "gemini-2.5-flash-preview-tts".to_string(),
            voice: "Puck".to_string(),
            temperature: 0.8,
        }
    }
}

/// Gemini API client implementing all three collaborators
pub struct GeminiClient {
    client: Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn model_url(&self, model: &str, method: &str) -> String {
        format!("{}/models/{}:{}", self.config.api_base, model, method)
    }

    /// POST a JSON body and decode the JSON reply
    async fn post<B: Serialize, R: DeserializeOwned>(&self, url: &str, body: &B) -> Result<R> {
        debug!("POST {}", url);

        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(body)
            .send()
            .await
            .context("Failed to send request to Gemini API")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Gemini API error: {} - {}", status, api_error_message(&body));
        }

        response
            .json()
            .await
            .context("Failed to parse Gemini API response")
    }
}

#[async_trait]
impl StoryWriter for GeminiClient {
    async fn write_story(&self, system: &str, user: &str) -> Result<String> {
        let request = GenerateContentRequest {
            system_instruction: Some(Content::text(None, system)),
            contents: vec![Content::text(Some("user"), user)],
            generation_config: GenerationConfig {
                temperature: Some(self.config.temperature),
                response_mime_type: Some("application/json".to_string()),
                ..Default::default()
            },
        };

        let url = self.model_url(&self.config.text_model, "generateContent");
        let response: GenerateContentResponse = self.post(&url, &request).await?;
        extract_text(response)
    }
}

#[async_trait]
impl Illustrator for GeminiClient {
    async fn illustrate(&self, prompt: &str) -> Result<Vec<GeneratedImage>> {
        let request = PredictRequest {
            instances: vec![PredictInstance {
                prompt: prompt.to_string(),
            }],
            parameters: PredictParameters { sample_count: 1 },
        };

        let url = self.model_url(&self.config.image_model, "predict");
        let response: PredictResponse = self.post(&url, &request).await?;
        Ok(extract_images(response))
    }
}

#[async_trait]
impl Narrator for GeminiClient {
    async fn narrate(&self, text: &str) -> Result<SpeechClip> {
        let request = GenerateContentRequest {
            system_instruction: None,
            contents: vec![Content::text(Some("user"), &build_narration_prompt(text))],
            generation_config: GenerationConfig {
                response_modalities: Some(vec!["AUDIO".to_string()]),
                speech_config: Some(SpeechConfig {
                    voice_config: VoiceConfig {
                        prebuilt_voice_config: PrebuiltVoiceConfig {
                            voice_name: self.config.voice.clone(),
                        },
                    },
                }),
                ..Default::default()
            },
        };

        let url = self.model_url(&self.config.tts_model, "generateContent");
        let response: GenerateContentResponse = self.post(&url, &request).await?;
        extract_speech(response)
    }
}

/// Pull the `error.message` out of an error body, falling back to the raw body
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string())
}

/// Text of the first part of the first candidate
fn extract_text(response: GenerateContentResponse) -> Result<String> {
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .context("No candidates in Gemini response")?;
    let finish_reason = candidate.finish_reason.clone();

    candidate
        .content
        .and_then(|c| c.parts.into_iter().find_map(|p| p.text))
        .with_context(|| {
            format!(
                "No text content in Gemini response (finish reason: {})",
                finish_reason.as_deref().unwrap_or("UNKNOWN")
            )
        })
}

/// Inline audio of the first candidate
fn extract_speech(response: GenerateContentResponse) -> Result<SpeechClip> {
    response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|c| c.parts.into_iter().find_map(|p| p.inline_data))
        .map(|inline| SpeechClip {
            mime_type: inline.mime_type,
            data: inline.data,
        })
        .context("No audio content in Gemini response")
}

fn extract_images(response: PredictResponse) -> Vec<GeneratedImage> {
    response
        .predictions
        .into_iter()
        .filter_map(|p| {
            p.bytes_base64_encoded.map(|data| GeneratedImage {
                mime_type: p.mime_type.unwrap_or_else(|| "image/png".to_string()),
                data,
            })
        })
        .collect()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<TextPart>,
}

impl Content {
    fn text(role: Option<&str>, text: &str) -> Self {
        Self {
            role: role.map(str::to_string),
            parts: vec![TextPart {
                text: text.to_string(),
            }],
        }
    }
}

#[derive(Debug, Serialize)]
struct TextPart {
    text: String,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_modalities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    speech_config: Option<SpeechConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SpeechConfig {
    voice_config: VoiceConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceConfig {
    prebuilt_voice_config: PrebuiltVoiceConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PrebuiltVoiceConfig {
    voice_name: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    text: Option<String>,
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
struct PredictRequest {
    instances: Vec<PredictInstance>,
    parameters: PredictParameters,
}

#[derive(Debug, Serialize)]
struct PredictInstance {
    prompt: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PredictParameters {
    sample_count: u32,
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Prediction {
    bytes_base64_encoded: Option<String>,
    mime_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}
