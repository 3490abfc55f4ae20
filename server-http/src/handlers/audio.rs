use crate::models::{AudioUrlQuery, AudioUrlResponse, ErrorResponse};
use crate::state::AppState;
use crate::validation;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use tracing::{error, info};

/// GET /get_audio_url?url=...
pub async fn get_audio_url(
    State(state): State<AppState>,
    Query(query): Query<AudioUrlQuery>,
) -> Result<Json<AudioUrlResponse>, (StatusCode, Json<ErrorResponse>)> {
    let url = validation::require_url(query.url.as_deref()).map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(e.to_string())),
        )
    })?;

    info!("fetching audio URL for: {}", url);

    match state.resolver.resolve(url).await {
        Ok(audio_url) => Ok(Json(AudioUrlResponse { audio_url })),
        Err(e) => {
            // Tool detail stays in the log; clients get a generic message.
            error!("failed to resolve {}: {}", url, e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Failed to fetch audio URL")),
            ))
        }
    }
}
