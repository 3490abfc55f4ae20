use std::time::Duration;

/// Direct streamable audio URL as produced by the extraction tool.
/// Opaque to this service; never parsed or interpreted.
pub type AudioUrl = String;

/// Fixed construction-time settings for the resolver service.
/// There is no runtime reconfiguration.
#[derive(Clone, Debug)]
pub struct ResolverConfig {
    /// Maximum number of cached URLs.
    pub cache_capacity: usize,
    /// How long a successful extraction stays cached.
    pub cache_ttl: Duration,
    /// Budget for a single extraction attempt.
    pub extract_timeout: Duration,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            cache_capacity: 1000,
            cache_ttl: Duration::from_secs(3600),
            extract_timeout: Duration::from_secs(60),
        }
    }
}
