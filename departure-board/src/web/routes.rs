//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;
use tracing::warn;

use crate::board::LoadError;
use crate::transit::{TransitApi, TransportError};

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router<A: TransitApi + 'static>(state: AppState<A>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/departures", get(list_departures::<A>))
        .route("/api/departures/refresh", post(refresh_departures::<A>))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// The current board, filtered and sorted.
async fn list_departures<A: TransitApi + 'static>(
    State(state): State<AppState<A>>,
    Query(req): Query<DeparturesRequest>,
) -> Json<DeparturesResponse> {
    Json(current_board(&state, &req).await)
}

/// Reload the board, then return it.
///
/// If a newer refresh overtakes this one, the newer board is returned.
async fn refresh_departures<A: TransitApi + 'static>(
    State(state): State<AppState<A>>,
    Query(req): Query<DeparturesRequest>,
) -> Result<Json<DeparturesResponse>, AppError> {
    match state.board.load().await {
        Ok(_) | Err(LoadError::Stale { .. }) | Err(LoadError::Cancelled(_)) => {}
        Err(LoadError::Transport(e)) => return Err(AppError::from(e)),
    }

    Ok(Json(current_board(&state, &req).await))
}

async fn current_board<A: TransitApi + 'static>(
    state: &AppState<A>,
    req: &DeparturesRequest,
) -> DeparturesResponse {
    let snapshot = state.board.snapshot().await;
    DeparturesResponse::from_snapshot(
        state.board.mode().label(),
        &snapshot,
        &req.to_query(),
        Utc::now(),
    )
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    /// The transit API could not be reached or answered with an error
    Upstream { status: Option<u16>, message: String },
}

impl From<TransportError> for AppError {
    fn from(e: TransportError) -> Self {
        AppError::Upstream {
            status: e.status(),
            message: e.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Upstream { status, message } => {
                warn!(upstream_status = ?status, "{message}");
                (StatusCode::BAD_GATEWAY, message)
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
