// shared/src/lib.rs

/// Errors shared across the workspace.
///
/// `Clone` matters here: one extraction outcome is fanned out to every caller
/// coalesced onto the same in-flight request.
#[derive(thiserror::Error, Debug, Clone)]
pub enum Error {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("extraction failed: {0}")]
    ExtractionFailed(String),
    #[error("extraction timed out after {0}s")]
    Timeout(u64),
    #[error("internal: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;

pub mod config;
