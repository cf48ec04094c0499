use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{error, info};
use uuid::Uuid;

use crate::{
    quiz::models::OptionKey,
    server::{app_state::AppState, error::ServerError},
    session::{
        models::{Page, Session, SessionError},
        views::PageView,
    },
};

pub fn session_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", post(create_session))
        .route("/{session_id}", get(get_page).delete(delete_session))
        .route("/{session_id}/start", post(start_quiz))
        .route("/{session_id}/answer", post(submit_answer))
        .route("/{session_id}/next", post(next_question))
        .route("/{session_id}/results", post(view_results))
        .route("/{session_id}/restart", post(restart_quiz))
        .route("/{session_id}/reset", post(reset_session))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct StartQuizRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct SubmitAnswerRequest {
    pub option: OptionKey,
}

#[derive(Debug, Serialize)]
struct CreateSessionResponse {
    session_id: Uuid,
    page: PageView,
}

async fn create_session(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ServerError> {
    let (session_id, session) = state.sessions().create();
    let guard = session.lock().await;
    let page = PageView::from_session(&guard)?;
    info!("Created session: {}", session_id);

    Ok((StatusCode::CREATED, Json(CreateSessionResponse { session_id, page })))
}

async fn get_page(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServerError> {
    let session = fetch_session(&state, &session_id)?;
    let mut guard = session.lock().await;
    guard.touch();

    let page = PageView::from_session(&guard)?;
    Ok((StatusCode::OK, Json(page)))
}

async fn start_quiz(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<StartQuizRequest>,
) -> Result<impl IntoResponse, ServerError> {
    let session = fetch_session(&state, &session_id)?;
    let mut guard = session.lock().await;
    guard.touch();

    if !matches!(guard.page, Page::Start) {
        return Err(SessionError::QuizInProgress.into());
    }
    guard.set_student_name(&request.name)?;

    // The session lock is held across the retry loop, so a session can
    // never have two generation calls in flight.
    let quiz = match state.generator().generate_quiz().await {
        Ok(quiz) => quiz,
        Err(e) => {
            error!("Quiz generation failed for session {}: {}", session_id, e);
            return Err(ServerError::Generation(e));
        }
    };

    info!(
        "Session {} generated a quiz with {} questions for {}",
        session_id,
        quiz.len(),
        guard.student_name
    );
    guard.begin(quiz)?;

    let page = PageView::from_session(&guard)?;
    Ok((StatusCode::OK, Json(page)))
}

async fn submit_answer(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<SubmitAnswerRequest>,
) -> Result<impl IntoResponse, ServerError> {
    let session = fetch_session(&state, &session_id)?;
    let mut guard = session.lock().await;
    guard.touch();

    guard.submit_answer(request.option)?;

    let page = PageView::from_session(&guard)?;
    Ok((StatusCode::OK, Json(page)))
}

async fn next_question(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServerError> {
    let session = fetch_session(&state, &session_id)?;
    let mut guard = session.lock().await;
    guard.touch();

    guard.advance()?;

    let page = PageView::from_session(&guard)?;
    Ok((StatusCode::OK, Json(page)))
}

async fn view_results(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServerError> {
    let session = fetch_session(&state, &session_id)?;
    let mut guard = session.lock().await;
    guard.touch();

    guard.finish()?;
    info!(
        "Session {} finished with score {}",
        session_id, guard.score
    );

    let page = PageView::from_session(&guard)?;
    Ok((StatusCode::OK, Json(page)))
}

async fn restart_quiz(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServerError> {
    let session = fetch_session(&state, &session_id)?;
    let mut guard = session.lock().await;
    guard.touch();

    guard.restart()?;

    let page = PageView::from_session(&guard)?;
    Ok((StatusCode::OK, Json(page)))
}

async fn reset_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServerError> {
    let session = fetch_session(&state, &session_id)?;
    let mut guard = session.lock().await;

    guard.reset();
    info!("Session {} was reset", session_id);

    let page = PageView::from_session(&guard)?;
    Ok((StatusCode::OK, Json(page)))
}

async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServerError> {
    fetch_session(&state, &session_id)?;
    state.sessions().remove(&session_id);
    info!("Session {} deleted", session_id);

    Ok(StatusCode::NO_CONTENT)
}

fn fetch_session(
    state: &AppState,
    session_id: &Uuid,
) -> Result<Arc<Mutex<Session>>, ServerError> {
    state
        .sessions()
        .get(session_id)
        .ok_or_else(|| ServerError::NotFound("Session not found".into()))
}
