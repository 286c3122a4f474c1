use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Strategy(#[from] chess_strategist_core::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Strategy(e) if e.is_client_error() => {
                tracing::warn!("Rejected request: {e}");
                (StatusCode::BAD_REQUEST, e.to_string())
            }
            AppError::Strategy(e) => {
                tracing::error!("Strategy analysis failed: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        };

        (status, Json(json!({ "detail": message }))).into_response()
    }
}
