use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use crate::error::AppError;
use crate::pipeline::export;
use crate::state::AppState;
use crate::types::activity::EnrichedDrop;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/activities/:file_id/drops", get(drops))
        .route("/api/activities/:file_id/export", get(export_gpx))
}

async fn drops(
    State(state): State<AppState>,
    Path(file_id): Path<String>,
) -> Result<Json<Vec<EnrichedDrop>>, AppError> {
    let processed = state
        .get(&file_id)
        .ok_or_else(|| AppError::NotFound(file_id.clone()))?;

    Ok(Json(processed.drops.clone()))
}

async fn export_gpx(
    State(state): State<AppState>,
    Path(file_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let processed = state
        .get(&file_id)
        .ok_or_else(|| AppError::NotFound(file_id.clone()))?;

    let gpx = export::to_gpx(&processed.drops, &file_id)?;

    tracing::info!(
        "Exported {} drops for file {} ({} bytes)",
        processed.drops.len(),
        file_id,
        gpx.len()
    );

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/gpx+xml".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}.gpx\"", file_id),
            ),
        ],
        gpx,
    ))
}
