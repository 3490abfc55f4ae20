use serde::{Deserialize, Serialize};

// === Audio Resolution Models ===

/// Query string for GET /get_audio_url
#[derive(Deserialize)]
pub struct AudioUrlQuery {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AudioUrlResponse {
    pub audio_url: String,
}

// === Service Models ===

#[derive(Serialize)]
pub struct WelcomeResponse {
    pub message: String,
    pub usage: String,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub message: String,
}

// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
