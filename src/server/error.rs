use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

use crate::{quiz::generator::GenerationError, session::models::SessionError};

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("Quiz generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ServerError {
    fn status(&self) -> StatusCode {
        match self {
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::Session(SessionError::EmptyName) => StatusCode::UNPROCESSABLE_ENTITY,
            ServerError::Session(_) => StatusCode::CONFLICT,
            ServerError::Generation(_) => StatusCode::BAD_GATEWAY,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        error!("Request failed: {} - {}", status, self);

        let body = match &self {
            // Generation exhaustion is terminal for this quiz attempt, the
            // client is told the session can still be reset and tried again.
            ServerError::Generation(_) => json!({
                "error": "No se pudo generar el quiz después de varios intentos. Por favor, reinicia la aplicación para intentarlo de nuevo.",
                "can_reset": true,
            }),
            _ => json!({ "error": self.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}
