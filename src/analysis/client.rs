use super::model::AnalysisResult;
use super::schema::{SYSTEM_INSTRUCTION, response_schema};
use super::wire::decode_analysis;
use crate::error::AnalyzerError;
use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Something that can analyze a serialized workflow.
#[async_trait]
pub trait Analyzer: Send + Sync {
    /// Analyzes one UTF-8 JSON document.
    async fn analyze(&self, workflow_json: &str) -> Result<AnalysisResult, AnalyzerError>;
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Analyzer backed by the Gemini `generateContent` endpoint.
pub struct GeminiAnalyzer {
    config: GeminiConfig,
    client: reqwest::Client,
}

impl GeminiAnalyzer {
    pub fn new(config: GeminiConfig) -> Result<Self, AnalyzerError> {
        if config.api_key.trim().is_empty() {
            return Err(AnalyzerError::MissingCredential);
        }
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AnalyzerError::Network(e.to_string()))?;
        Ok(Self { config, client })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    fn build_headers(&self) -> Result<HeaderMap, AnalyzerError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-goog-api-key",
            HeaderValue::from_str(&self.config.api_key)
                .map_err(|e| AnalyzerError::CredentialRejected(e.to_string()))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    /// Builds the request body for one workflow.
    pub fn build_payload(workflow_json: &str) -> Value {
        json!({
            "systemInstruction": {
                "parts": [{ "text": SYSTEM_INSTRUCTION }]
            },
            "contents": [{
                "role": "user",
                "parts": [{ "text": format!("Analyze this workflow:\n{}", workflow_json) }]
            }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": response_schema()
            }
        })
    }

    /// Concatenates the text parts of the first candidate.
    pub fn extract_text(body: &Value) -> Result<String, AnalyzerError> {
        let parts = body
            .pointer("/candidates/0/content/parts")
            .and_then(|v| v.as_array())
            .ok_or_else(|| match body.pointer("/promptFeedback/blockReason") {
                Some(reason) => AnalyzerError::Api {
                    status: 200,
                    message: format!("Request blocked: {}", reason),
                },
                None => AnalyzerError::EmptyResponse,
            })?;

        let text: String = parts
            .iter()
            .filter_map(|part| part.get("text").and_then(|t| t.as_str()))
            .collect();

        if text.trim().is_empty() {
            Err(AnalyzerError::EmptyResponse)
        } else {
            Ok(text)
        }
    }

    /// Maps a non-success HTTP response onto an `AnalyzerError`.
    pub fn map_error(status: u16, body: &str) -> AnalyzerError {
        let message = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|v| {
                v.pointer("/error/message")
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| body.trim().to_string());

        let key_invalid = body.contains("API_KEY_INVALID") || body.contains("API key not valid");
        if status == 401 || status == 403 || key_invalid {
            return AnalyzerError::CredentialRejected(message);
        }
        AnalyzerError::Api { status, message }
    }
}

#[async_trait]
impl Analyzer for GeminiAnalyzer {
    async fn analyze(&self, workflow_json: &str) -> Result<AnalysisResult, AnalyzerError> {
        let headers = self.build_headers()?;
        let payload = Self::build_payload(workflow_json);
        info!(model = %self.config.model, bytes = workflow_json.len(), "Requesting analysis");

        let response = self
            .client
            .post(self.endpoint())
            .headers(headers)
            .json(&payload)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let text = response.text().await.map_err(map_transport_error)?;

        if !status.is_success() {
            return Err(Self::map_error(status.as_u16(), &text));
        }

        let body: Value = serde_json::from_str(&text)
            .map_err(|e| AnalyzerError::MalformedPayload(e.to_string()))?;
        let content = Self::extract_text(&body)?;
        debug!(bytes = content.len(), "Received analysis payload");
        decode_analysis(&content)
    }
}

fn map_transport_error(error: reqwest::Error) -> AnalyzerError {
    if error.is_timeout() {
        AnalyzerError::Timeout
    } else {
        AnalyzerError::Network(error.to_string())
    }
}
