// OpenAI-compatible vision oracle
//
// Sends each frame to a chat-completions endpoint with a metrics prompt and
// parses the reply. Any endpoint that speaks the same request/response shape
// (Azure, local gateways) works by overriding `endpoint`.

use std::time::Duration;
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::Deserialize;

use crate::constants::{
    DEFAULT_OPENAI_ENDPOINT, DEFAULT_OPENAI_MODEL, ENV_OPENAI_API_KEY, ENV_OPENAI_ENDPOINT,
    ENV_OPENAI_MODEL, OPENAI_MAX_TOKENS, OPENAI_ORACLE_NAME, OPENAI_TEMPERATURE,
    OPENAI_TIMEOUT_SECS,
};
use crate::error::{Result, ThumbError};
use crate::extract::RawFrame;
use crate::oracle::{parse, AnalysisOptions, AnalysisRecord, VisionOracle};

/// Connection settings for the oracle.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub model: String,
    pub endpoint: String,
    pub max_tokens: u32,
    pub temperature: f64,
    pub timeout: Duration,
}

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_OPENAI_MODEL.to_string(),
            endpoint: DEFAULT_OPENAI_ENDPOINT.to_string(),
            max_tokens: OPENAI_MAX_TOKENS,
            temperature: OPENAI_TEMPERATURE,
            timeout: Duration::from_secs(OPENAI_TIMEOUT_SECS),
        }
    }

    /// Build from OPENAI_API_KEY, THUMBPICK_OPENAI_MODEL and THUMBPICK_OPENAI_ENDPOINT.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(ENV_OPENAI_API_KEY)
            .map_err(|_| ThumbError::Config(format!("Missing required configuration: {}", ENV_OPENAI_API_KEY)))?;

        let mut config = Self::new(api_key);
        if let Ok(model) = std::env::var(ENV_OPENAI_MODEL) {
            config.model = model;
        }
        if let Ok(endpoint) = std::env::var(ENV_OPENAI_ENDPOINT) {
            config.endpoint = endpoint;
        }
        Ok(config)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

/// Vision oracle backed by an OpenAI-style chat-completions API.
pub struct OpenAiOracle {
    config: OpenAiConfig,
    client: reqwest::blocking::Client,
}

impl OpenAiOracle {
    /// Create a fully configured oracle. Fails if the API key is empty.
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(ThumbError::Config("Missing required configuration: apiKey".to_string()));
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self { config, client })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn request_body(&self, frame: &RawFrame, prompt: &str) -> serde_json::Value {
        let image_url = format!(
            "data:{};base64,{}",
            mime_type(&frame.encoding),
            STANDARD.encode(&frame.pixel_bytes)
        );

        serde_json::json!({
            "model": self.config.model,
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "text", "text": prompt },
                    { "type": "image_url",
                      "image_url": { "url": image_url, "detail": "high" } }
                ]
            }],
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature
        })
    }

    fn complete(&self, body: &serde_json::Value) -> Result<String> {
        let resp = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(body)
            .send()?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().unwrap_or_default();
            return Err(ThumbError::Oracle(format!("HTTP {}: {}", status, text.trim())));
        }

        let parsed: ChatResponse = resp.json()?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| ThumbError::Oracle("No response content from OpenAI".to_string()))
    }
}

impl VisionOracle for OpenAiOracle {
    fn name(&self) -> &str {
        OPENAI_ORACLE_NAME
    }

    fn analyze(&self, frame: &RawFrame, options: &AnalysisOptions) -> Result<AnalysisRecord> {
        let prompt = build_prompt(options);
        let body = self.request_body(frame, &prompt);

        log::debug!("Analyzing frame at {:.3}s via {}", frame.timestamp, self.config.model);

        let content = self.complete(&body).map_err(|e| {
            let cause = match e {
                ThumbError::Oracle(msg) => msg,
                other => other.to_string(),
            };
            ThumbError::Oracle(format!("OpenAI Vision analysis failed: {}", cause))
        })?;

        parse::parse_analysis_response(&content, options)
    }
}

/// Build the analysis prompt. A custom prompt replaces the built-in one.
pub fn build_prompt(options: &AnalysisOptions) -> String {
    if let Some(custom) = &options.custom_prompt {
        return custom.clone();
    }

    let mut prompt = String::from(
        "Analyze this video frame for thumbnail potential. Rate each aspect from 0-100 and provide reasoning:

REQUIRED METRICS:
- Colorfulness: How vibrant and diverse are the colors?
- Contrast: How well do elements stand out from each other?
- Brightness: Overall lighting quality (avoid too dark/bright)
- Sharpness: Image clarity and focus quality

Format your response as JSON:
{
  \"colorfulness\": <0-100>,
  \"contrast\": <0-100>,
  \"brightness\": <0-100>,
  \"sharpness\": <0-100>",
    );

    if options.include_objects {
        prompt.push_str(",\n  \"objectCount\": <number of distinct objects>");
    }

    if options.include_faces {
        prompt.push_str(",\n  \"faceCount\": <number of faces detected>");
    }

    if options.include_text {
        prompt.push_str(",\n  \"textDetected\": <true/false>");
    }

    if options.include_description {
        prompt.push_str(
            ",\n  \"description\": \"<brief description of the scene>\",\n  \"tags\": [\"<relevant>\", \"<descriptive>\", \"<tags>\"]",
        );
    }

    prompt.push_str(
        "\n}\n\nPrioritize frames that would make engaging thumbnails with good visual appeal for video content.",
    );

    prompt
}

fn mime_type(encoding: &str) -> String {
    match encoding.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => "image/jpeg".to_string(),
        other => format!("image/{}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_includes_only_requested_fields() {
        let options = AnalysisOptions {
            include_objects: false,
            include_faces: true,
            include_text: false,
            include_description: false,
            custom_prompt: None,
        };
        let prompt = build_prompt(&options);
        assert!(prompt.contains("\"sharpness\": <0-100>"));
        assert!(prompt.contains("faceCount"));
        assert!(!prompt.contains("objectCount"));
        assert!(!prompt.contains("textDetected"));
        assert!(!prompt.contains("tags"));
        assert!(prompt.trim_end().ends_with("video content."));
    }

    #[test]
    fn test_prompt_all_fields() {
        let prompt = build_prompt(&AnalysisOptions::default());
        for field in ["objectCount", "faceCount", "textDetected", "description", "tags"] {
            assert!(prompt.contains(field), "prompt should ask for {}", field);
        }
    }

    #[test]
    fn test_custom_prompt_wins() {
        let options = AnalysisOptions {
            custom_prompt: Some("Rate this frame.".to_string()),
            ..AnalysisOptions::default()
        };
        assert_eq!(build_prompt(&options), "Rate this frame.");
    }

    #[test]
    fn test_missing_api_key_is_rejected() {
        let err = OpenAiOracle::new(OpenAiConfig::new("  ")).err().unwrap();
        assert!(matches!(err, ThumbError::Config(_)));
    }

    #[test]
    fn test_request_body_shape() {
        let oracle = OpenAiOracle::new(OpenAiConfig::new("sk-test").with_model("gpt-4o-mini")).unwrap();
        let frame = RawFrame {
            timestamp: 2.0,
            pixel_bytes: b"abc".to_vec(),
            width: 1,
            height: 1,
            encoding: "png".to_string(),
        };

        let body = oracle.request_body(&frame, "hello");
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["max_tokens"], 500);
        assert_eq!(body["messages"][0]["content"][0]["text"], "hello");
        assert_eq!(
            body["messages"][0]["content"][1]["image_url"]["url"],
            "data:image/png;base64,YWJj"
        );
        assert_eq!(oracle.name(), "OpenAI GPT-4 Vision");
    }

    #[test]
    fn test_mime_type() {
        assert_eq!(mime_type("png"), "image/png");
        assert_eq!(mime_type("JPG"), "image/jpeg");
    }
}
