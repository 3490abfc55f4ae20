use shared::config::Config;
use std::sync::Arc;
use timbre::domain::ResolverConfig;
use timbre::ports::ResolveAudio;
use timbre::{AudioResolver, WorkerPool, YtDlpExtractor};

/// Server state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<dyn ResolveAudio>,
}

impl AppState {
    /// Wire up the resolver service from configuration: one worker pool, one
    /// cache, one extractor, constructed at startup and injected into the
    /// router.
    pub fn new(config: &Config) -> Self {
        let pool = Arc::new(WorkerPool::new(config.pool_workers));
        let resolver = AudioResolver::new(
            YtDlpExtractor::new(config.yt_dlp_bin.clone()),
            pool,
            ResolverConfig {
                cache_capacity: config.cache_capacity,
                cache_ttl: config.cache_ttl(),
                extract_timeout: config.extract_timeout(),
            },
        );

        Self {
            resolver: Arc::new(resolver),
        }
    }

    /// Build state around an existing resolver (tests, alternative
    /// transports).
    pub fn with_resolver(resolver: Arc<dyn ResolveAudio>) -> Self {
        Self { resolver }
    }
}
