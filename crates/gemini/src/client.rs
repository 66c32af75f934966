use reqwest::header::RETRY_AFTER;
use reqwest::Client;
use tracing::{debug, error, warn};

use crate::error::{GeminiError, GeminiResult};
use crate::schema::ResponseSchema;
use crate::types::*;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Client for the Gemini `generateContent` API
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: String, base_url: String, model: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        }
    }

    /// Client against the public endpoint with the default model
    pub fn with_api_key(api_key: String) -> Self {
        Self::new(api_key, DEFAULT_BASE_URL.to_string(), DEFAULT_MODEL.to_string())
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Ask for JSON matching `schema` and return the generated text.
    ///
    /// One attempt only. A response with no candidates yields an empty
    /// string; the caller decides what blank output means.
    pub async fn generate_content(
        &self,
        prompt: &str,
        schema: &ResponseSchema,
    ) -> GeminiResult<String> {
        debug!(
            "Generating content with model {} ({} prompt chars)",
            self.model,
            prompt.len()
        );

        let request = GenerateContentRequest {
            contents: vec![Content::user(prompt)],
            generation_config: GenerationConfig::json(schema.clone()),
        };

        let response = self
            .client
            .post(format!(
                "{}/models/{}:generateContent",
                self.base_url, self.model
            ))
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            if status.as_u16() == 429 {
                let retry_after = response
                    .headers()
                    .get(RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.parse().ok());
                warn!("Rate limited by Gemini");
                return Err(GeminiError::RateLimited { retry_after });
            }

            let error_text = response.text().await.unwrap_or_default();

            if let Ok(error_resp) = serde_json::from_str::<GoogleApiError>(&error_text) {
                error!(
                    "Gemini API error: {} (status: {:?})",
                    error_resp.error.message, error_resp.error.status
                );
                return Err(GeminiError::Api {
                    message: error_resp.error.message,
                    status_code: Some(status.as_u16()),
                });
            }

            return Err(GeminiError::Api {
                message: error_text,
                status_code: Some(status.as_u16()),
            });
        }

        let body: GenerateContentResponse = response.json().await?;

        if body.candidates.is_empty() {
            let reason = body
                .prompt_feedback
                .as_ref()
                .and_then(|f| f.block_reason.as_deref())
                .unwrap_or("none given");
            warn!("Gemini returned no candidates (block reason: {})", reason);
        }

        if let Some(ref usage) = body.usage_metadata {
            debug!(
                prompt_tokens = ?usage.prompt_token_count,
                total_tokens = ?usage.total_token_count,
                "Gemini usage"
            );
        }

        Ok(body.text())
    }
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}
