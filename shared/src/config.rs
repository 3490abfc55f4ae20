use std::time::Duration;
use tracing::warn;

pub struct Config {
    pub host: String,
    pub http_port: u16,
    pub pool_workers: usize,
    pub cache_capacity: usize,
    pub cache_ttl_secs: u64,
    pub extract_timeout_secs: u64,
    pub yt_dlp_bin: String,
    pub allowed_origins: Vec<String>,
}

impl Config {
    const DEFAULT_HOST: &str = "0.0.0.0";
    const DEFAULT_HTTP_PORT: u16 = 8080;
    const DEFAULT_POOL_WORKERS: usize = 20;
    const DEFAULT_CACHE_CAPACITY: usize = 1000;
    const DEFAULT_CACHE_TTL_SECS: u64 = 3600;
    const DEFAULT_EXTRACT_TIMEOUT_SECS: u64 = 60;
    const DEFAULT_YTDLP_BIN: &str = "yt-dlp";

    pub fn from_env() -> Self {
        let pool_workers = std::env::var("TIMBRE_POOL_WORKERS")
            .unwrap_or_else(|_| Self::DEFAULT_POOL_WORKERS.to_string())
            .parse::<usize>()
            .unwrap_or(Self::DEFAULT_POOL_WORKERS);
        let cache_capacity = std::env::var("TIMBRE_CACHE_CAPACITY")
            .unwrap_or_else(|_| Self::DEFAULT_CACHE_CAPACITY.to_string())
            .parse::<usize>()
            .unwrap_or(Self::DEFAULT_CACHE_CAPACITY);
        Self {
            host: std::env::var("TIMBRE_HOST").unwrap_or_else(|_| Self::DEFAULT_HOST.to_string()),
            http_port: std::env::var("TIMBRE_HTTP_PORT")
                .unwrap_or_else(|_| Self::DEFAULT_HTTP_PORT.to_string())
                .parse::<u16>()
                .unwrap_or(Self::DEFAULT_HTTP_PORT),
            pool_workers: if pool_workers == 0 {
                warn!("TIMBRE_POOL_WORKERS must be at least 1, using default");
                Self::DEFAULT_POOL_WORKERS
            } else {
                pool_workers
            },
            cache_capacity: if cache_capacity == 0 {
                warn!("TIMBRE_CACHE_CAPACITY must be at least 1, using default");
                Self::DEFAULT_CACHE_CAPACITY
            } else {
                cache_capacity
            },
            cache_ttl_secs: std::env::var("TIMBRE_CACHE_TTL_SECS")
                .unwrap_or_else(|_| Self::DEFAULT_CACHE_TTL_SECS.to_string())
                .parse::<u64>()
                .unwrap_or(Self::DEFAULT_CACHE_TTL_SECS),
            extract_timeout_secs: std::env::var("TIMBRE_EXTRACT_TIMEOUT_SECS")
                .unwrap_or_else(|_| Self::DEFAULT_EXTRACT_TIMEOUT_SECS.to_string())
                .parse::<u64>()
                .unwrap_or(Self::DEFAULT_EXTRACT_TIMEOUT_SECS),
            yt_dlp_bin: std::env::var("TIMBRE_YTDLP_BIN")
                .unwrap_or_else(|_| Self::DEFAULT_YTDLP_BIN.to_string()),
            allowed_origins: std::env::var("TIMBRE_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "*".to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn extract_timeout(&self) -> Duration {
        Duration::from_secs(self.extract_timeout_secs)
    }
}
