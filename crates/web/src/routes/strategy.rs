use axum::{extract::State, Json};
use std::sync::Arc;

use chess_strategist_core::service::BatchRequest;
use chess_strategist_core::{BatchSummary, GamePosition, PipelineOutput, SingleSummary};

use crate::error::AppError;
use crate::AppState;

pub async fn analyze_strategy(
    State(state): State<Arc<AppState>>,
    Json(request): Json<BatchRequest>,
) -> Result<Json<BatchSummary>, AppError> {
    tracing::info!("Analyzing {} positions", request.positions.len());
    let summary = state.service.analyze_batch(request.positions).await?;
    Ok(Json(summary))
}

pub async fn analyze_single_strategy(
    State(state): State<Arc<AppState>>,
    Json(position): Json<GamePosition>,
) -> Result<Json<SingleSummary>, AppError> {
    tracing::info!("Analyzing single position for {}", position.side);
    let summary = state.service.analyze_single(position).await?;
    Ok(Json(summary))
}

pub async fn analyze(
    State(state): State<Arc<AppState>>,
    Json(position): Json<GamePosition>,
) -> Result<Json<PipelineOutput>, AppError> {
    let output = state.service.analyze(position).await?;
    Ok(Json(output))
}
