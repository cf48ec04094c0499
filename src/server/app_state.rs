use std::sync::Arc;

use reqwest::Client;

use crate::{
    client::gemini_client::{GeminiClient, GenerateContent},
    config::config::CONFIG,
    quiz::generator::{QuizGenerator, RetryPolicy},
    server::error::ServerError,
    session::store::SessionStore,
};

pub struct AppState {
    generator: QuizGenerator,
    sessions: SessionStore,
}

impl AppState {
    pub fn from_config() -> Result<Arc<Self>, ServerError> {
        if CONFIG.gemini.api_key.trim().is_empty() {
            return Err(ServerError::Internal(
                "Missing model service credential, set LINEAL__GEMINI__API_KEY".into(),
            ));
        }

        let client = Client::new();
        let gemini = GeminiClient::new(
            client,
            &CONFIG.gemini.domain,
            &CONFIG.gemini.model,
            &CONFIG.gemini.api_key,
        );

        Ok(Self::with_backend(Arc::new(gemini), RetryPolicy::default()))
    }

    /// Builds the state around any content backend. Tests hand in stubs and
    /// a zero-delay retry policy.
    pub fn with_backend(backend: Arc<dyn GenerateContent>, retry: RetryPolicy) -> Arc<Self> {
        Arc::new(Self {
            generator: QuizGenerator::new(backend, retry),
            sessions: SessionStore::new(),
        })
    }

    pub fn generator(&self) -> &QuizGenerator {
        &self.generator
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }
}
