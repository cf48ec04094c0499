use axum::{Router, response::IntoResponse, routing::get};

pub fn health_routes() -> Router {
    Router::new().route("/", get(health))
}

async fn health() -> impl IntoResponse {
    "OK".into_response()
}
