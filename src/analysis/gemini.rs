use serde_json::{Value, json};

use crate::analysis::TextGenerator;
use crate::config::GeminiConfig;
use crate::errors::AppError;

/// Google Gemini `generateContent` client.
#[derive(Clone)]
pub struct GeminiClient {
    http_client: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self, AppError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::Upstream(e.to_string()))?;
        Ok(Self { http_client, config })
    }

    /// The usable API key, or a configuration error naming the variable to set.
    pub fn ensure_configured(&self) -> Result<&str, AppError> {
        self.config.usable_key().ok_or_else(|| {
            AppError::Configuration(
                "Gemini API key not configured. Set GEMINI_API_KEY to enable AI analysis".to_string(),
            )
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }
}

/// The first candidate's text, if the response has one.
fn candidate_text(body: &Value) -> Option<&str> {
    body.pointer("/candidates/0/content/parts/0/text")
        .and_then(Value::as_str)
        .filter(|t| !t.trim().is_empty())
}

impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, AppError> {
        let api_key = self.ensure_configured()?;

        log::debug!("Requesting analysis from model {}", self.config.model);
        let response = self
            .http_client
            .post(self.endpoint())
            .query(&[("key", api_key)])
            .json(&json!({ "contents": [{ "parts": [{ "text": prompt }] }] }))
            .send()
            .await
            .map_err(|e| AppError::Upstream(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            log::error!("Gemini answered {status}: {error_text}");
            return Err(AppError::Upstream(format!("text-generation service returned {status}")));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(e.to_string()))?;
        match candidate_text(&body) {
            Some(text) => Ok(text.to_string()),
            None => {
                log::error!("Gemini response without candidate text: {body}");
                Err(AppError::Upstream("empty response from text-generation service".to_string()))
            }
        }
    }
}
