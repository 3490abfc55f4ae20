#![deny(clippy::all)]

use crate::domain::AudioUrl;
use async_trait::async_trait;
use shared::Result;

// Ports are the pluggable extension points for the extraction tool and the
// resolver service itself.

/// Port for the external extraction tool.
///
/// A call may block for seconds and is treated as opaque: one attempt per
/// invocation, no retries. Callers run it on the worker pool, never on the
/// async scheduler.
pub trait MediaExtractor: Send + Sync + 'static {
    fn extract(&self, url: &str) -> Result<AudioUrl>;
}

/// Application-level resolve port consumed by transport layers.
///
/// Implementations assume a non-empty URL; presence validation belongs to the
/// transport.
#[async_trait]
pub trait ResolveAudio: Send + Sync + 'static {
    async fn resolve(&self, url: &str) -> Result<AudioUrl>;
}
