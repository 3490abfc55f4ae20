use crate::models::{HealthResponse, WelcomeResponse};
use axum::{http::StatusCode, Json};

/// GET /
pub async fn root() -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        message: "Welcome to the timbre audio URL API!".into(),
        usage: "/get_audio_url?url=https://youtu.be/kKZCjHz2yEU".into(),
    })
}

/// GET /health
pub async fn health_check() -> Result<Json<HealthResponse>, StatusCode> {
    Ok(Json(HealthResponse {
        message: "OK".into(),
    }))
}
