pub mod cache;
pub mod domain;
pub mod extract;
pub mod pool;
pub mod ports;
pub mod resolve;

// Re-export key types
pub use cache::TtlCache;
pub use extract::YtDlpExtractor;
pub use pool::WorkerPool;
pub use resolve::AudioResolver;
