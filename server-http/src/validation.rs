//! Validation of the inbound audio URL query.
//!
//! The resolver uses the URL as an opaque cache key, so validation is
//! deliberately thin: the parameter must be present and non-empty. No
//! trimming or canonicalization happens here; the raw string is the key.

#[derive(Debug, PartialEq)]
pub enum ValidationError {
    MissingUrl,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::MissingUrl => {
                write!(f, "Missing video URL in 'url' query parameter")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

pub fn require_url(url: Option<&str>) -> Result<&str, ValidationError> {
    match url {
        Some(url) if !url.is_empty() => Ok(url),
        _ => Err(ValidationError::MissingUrl),
    }
}
