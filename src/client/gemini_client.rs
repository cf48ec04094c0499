use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

#[derive(Debug, thiserror::Error)]
pub enum GeminiClientError {
    #[error("Http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Api error: {0} - {1}")]
    ApiError(StatusCode, String),

    #[error("Model response contained no text")]
    EmptyResponse,
}

/// Prompt-in, text-out contract against the content generation service.
/// The production implementation is [`GeminiClient`], tests hand in stubs.
#[async_trait]
pub trait GenerateContent: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GeminiClientError>;
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    domain: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(
        client: Client,
        domain: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            domain: domain.into(),
            model: model.into(),
            api_key: api_key.into(),
        }
    }

    pub async fn generate_content(&self, prompt: &str) -> Result<String, GeminiClientError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.domain, self.model
        );

        info!("GeminiClient sending request to model: {}", self.model);
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or("No body".into());
            error!("GeminiClient request failed: {} - {}", status, body);
            return Err(GeminiClientError::ApiError(status, body));
        }

        let payload = response.json::<GenerateContentResponse>().await?;
        let text: String = payload
            .candidates
            .first()
            .map(|candidate| {
                candidate
                    .content
                    .parts
                    .iter()
                    .map(|part| part.text.as_str())
                    .collect()
            })
            .unwrap_or_default();

        if text.is_empty() {
            error!("GeminiClient received a response without any text parts");
            return Err(GeminiClientError::EmptyResponse);
        }

        Ok(text)
    }
}

#[async_trait]
impl GenerateContent for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, GeminiClientError> {
        self.generate_content(prompt).await
    }
}
