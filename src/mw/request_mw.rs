use axum::{body::Body, extract::Request, middleware::Next, response::Response};
use tracing::info;

pub async fn request_mw(req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;
    info!("{} {} - {}", method, path, response.status());

    response
}
