//! Gemini generative API client.
//!
//! Submits a prompt to the generateContent endpoint and returns the model's
//! text. Callers decide what a failure means; the article generator converts
//! failures here into the fallback template.

use secrecy::ExposeSecret;
use serde::Deserialize;

use crate::config::GeminiSettings;
use crate::error::{AppError, AppResult};

/// HTTP connect timeout for Gemini calls.
const HTTP_CONNECT_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(5);
/// HTTP total timeout for Gemini calls. Generation can take a while.
const HTTP_REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(60);

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// Client for the Gemini generateContent endpoint.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    settings: GeminiSettings,
}

impl GeminiClient {
    pub fn new(settings: GeminiSettings) -> Self {
        let http = reqwest::Client::builder()
            .connect_timeout(HTTP_CONNECT_TIMEOUT)
            .timeout(HTTP_REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client for Gemini");

        Self { http, settings }
    }

    /// Submit a prompt and return the generated text.
    pub async fn generate(&self, prompt: &str) -> AppResult<String> {
        let api_key = self.settings.api_key.as_ref().ok_or_else(|| {
            AppError::Upstream("GEMINI_API_KEY is not configured".to_string())
        })?;

        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.settings.api_base_url,
            self.settings.model,
            api_key.expose_secret()
        );

        let response = self
            .http
            .post(&url)
            .json(&serde_json::json!({
                "contents": [{ "parts": [{ "text": prompt }] }]
            }))
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Gemini request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Upstream(format!(
                "Gemini returned {}",
                response.status()
            )));
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Failed to parse Gemini response: {}", e)))?;

        let text: String = body
            .candidates
            .into_iter()
            .take(1)
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts)
            .filter_map(|p| p.text)
            .collect();

        if text.is_empty() {
            return Err(AppError::Upstream(
                "Gemini response contained no text".to_string(),
            ));
        }

        Ok(text)
    }
}
