use crate::cache::TtlCache;
use crate::domain::{AudioUrl, ResolverConfig};
use crate::pool::WorkerPool;
use crate::ports::{MediaExtractor, ResolveAudio};
use async_trait::async_trait;
use parking_lot::Mutex;
use shared::{Error, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::time::timeout;
use tracing::{error, info};

/// Coalescing audio URL resolver.
///
/// Repeated lookups for the same URL are served from a TTL cache, and at most
/// one extraction runs per URL at a time: concurrent misses for one key attach
/// to the same in-flight extraction and observe the same outcome. Successes
/// are cached for the configured TTL; failures reach every waiter and are
/// never cached, so the next call retries from scratch.
///
/// The URL string is the cache key byte-for-byte, with no normalization.
pub struct AudioResolver<E> {
    inner: Arc<Inner<E>>,
}

// Manual impl so `E` itself does not need `Clone`.
impl<E> Clone for AudioResolver<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Inner<E> {
    extractor: Arc<E>,
    pool: Arc<WorkerPool>,
    cache: TtlCache<String, AudioUrl>,
    inflight: Mutex<HashMap<String, broadcast::Sender<Result<AudioUrl>>>>,
    config: ResolverConfig,
}

enum Attached {
    Hit(AudioUrl),
    Wait(broadcast::Receiver<Result<AudioUrl>>),
}

impl<E: MediaExtractor> AudioResolver<E> {
    pub fn new(extractor: E, pool: Arc<WorkerPool>, config: ResolverConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                extractor: Arc::new(extractor),
                pool,
                cache: TtlCache::new(config.cache_capacity),
                inflight: Mutex::new(HashMap::new()),
                config,
            }),
        }
    }

    /// Resolve a video page URL to a direct audio stream URL.
    ///
    /// Callers must pass a non-empty URL; presence validation happens at the
    /// transport layer.
    pub async fn resolve(&self, url: &str) -> Result<AudioUrl> {
        if let Some(audio_url) = self.inner.cache.get(url) {
            info!("cache hit for: {}", url);
            return Ok(audio_url);
        }

        match self.attach(url) {
            Attached::Hit(audio_url) => Ok(audio_url),
            Attached::Wait(mut receiver) => match receiver.recv().await {
                Ok(outcome) => outcome,
                Err(_) => Err(Error::Internal("in-flight extraction went away".into())),
            },
        }
    }

    /// Attach to the in-flight extraction for `url`, starting one if none is
    /// running. Check and registration happen under a single lock, so two
    /// concurrent misses can never both start an extraction.
    fn attach(&self, url: &str) -> Attached {
        let (sender, receiver) = {
            let mut inflight = self.inner.inflight.lock();
            if let Some(sender) = inflight.get(url) {
                info!("joining in-flight extraction for: {}", url);
                return Attached::Wait(sender.subscribe());
            }
            // An extraction may have finished and populated the cache between
            // the fast-path check and taking this lock; recheck before
            // starting a fresh cycle.
            if let Some(audio_url) = self.inner.cache.get(url) {
                return Attached::Hit(audio_url);
            }
            info!("cache miss, extracting: {}", url);
            let (sender, receiver) = broadcast::channel(1);
            inflight.insert(url.to_owned(), sender.clone());
            (sender, receiver)
        };
        self.spawn_extraction(url.to_owned(), sender);
        Attached::Wait(receiver)
    }

    /// Run one extraction cycle from a detached task.
    ///
    /// Detachment means a caller that stops waiting does not cancel the
    /// extraction; the result still lands in the cache for future hits. The
    /// in-flight entry is removed before the outcome is broadcast, so a caller
    /// arriving afterwards starts a fresh cycle instead of subscribing to a
    /// channel that has already fired.
    fn spawn_extraction(&self, url: String, sender: broadcast::Sender<Result<AudioUrl>>) {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let outcome = inner.run_extraction(&url).await;
            if let Ok(audio_url) = &outcome {
                inner
                    .cache
                    .insert(url.clone(), audio_url.clone(), inner.config.cache_ttl);
            }
            inner.inflight.lock().remove(&url);
            // Every waiter may be gone already; that is fine.
            let _ = sender.send(outcome);
        });
    }
}

impl<E: MediaExtractor> Inner<E> {
    async fn run_extraction(&self, url: &str) -> Result<AudioUrl> {
        let extractor = Arc::clone(&self.extractor);
        let job_url = url.to_owned();
        let handle = self.pool.submit(move || extractor.extract(&job_url));

        let outcome = match timeout(self.config.extract_timeout, handle.join()).await {
            Ok(outcome) => outcome,
            Err(_) => {
                let secs = self.config.extract_timeout.as_secs();
                error!("extraction timed out after {}s for: {}", secs, url);
                return Err(Error::Timeout(secs));
            }
        };

        match outcome {
            Ok(audio_url) if audio_url.is_empty() => {
                error!("extractor returned no stream URL for: {}", url);
                Err(Error::ExtractionFailed(
                    "extractor returned no stream URL".into(),
                ))
            }
            Ok(audio_url) => Ok(audio_url),
            Err(e) => {
                error!("extraction failed for {}: {}", url, e);
                Err(e)
            }
        }
    }
}

#[async_trait]
impl<E: MediaExtractor> ResolveAudio for AudioResolver<E> {
    async fn resolve(&self, url: &str) -> Result<AudioUrl> {
        AudioResolver::resolve(self, url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Barrier;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    type Responder = Box<dyn Fn(&str) -> Result<AudioUrl> + Send + Sync>;

    struct FakeExtractor {
        calls: Arc<AtomicUsize>,
        delay: Duration,
        respond: Responder,
    }

    impl FakeExtractor {
        fn ok(calls: Arc<AtomicUsize>, delay: Duration) -> Self {
            Self {
                calls,
                delay,
                respond: Box::new(|url| Ok(format!("https://cdn.example/{}.m4a", url.len()))),
            }
        }

        fn with(calls: Arc<AtomicUsize>, delay: Duration, respond: Responder) -> Self {
            Self {
                calls,
                delay,
                respond,
            }
        }
    }

    impl MediaExtractor for FakeExtractor {
        fn extract(&self, url: &str) -> Result<AudioUrl> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                thread::sleep(self.delay);
            }
            (self.respond)(url)
        }
    }

    fn resolver(extractor: FakeExtractor, workers: usize, config: ResolverConfig) -> AudioResolver<FakeExtractor> {
        AudioResolver::new(extractor, Arc::new(WorkerPool::new(workers)), config)
    }

    #[tokio::test]
    async fn test_second_call_within_ttl_is_served_from_cache() {
        let calls = Arc::new(AtomicUsize::new(0));
        let resolver = resolver(
            FakeExtractor::ok(Arc::clone(&calls), Duration::ZERO),
            2,
            ResolverConfig::default(),
        );

        let first = resolver.resolve("https://youtu.be/abc").await.unwrap();
        let second = resolver.resolve("https://youtu.be/abc").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_expired_entry_triggers_fresh_extraction() {
        let calls = Arc::new(AtomicUsize::new(0));
        let config = ResolverConfig {
            cache_ttl: Duration::from_millis(40),
            ..ResolverConfig::default()
        };
        let resolver = resolver(FakeExtractor::ok(Arc::clone(&calls), Duration::ZERO), 2, config);

        resolver.resolve("https://youtu.be/abc").await.unwrap();
        tokio::time::sleep(Duration::from_millis(80)).await;
        resolver.resolve("https://youtu.be/abc").await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_concurrent_misses_coalesce_into_one_extraction() {
        let calls = Arc::new(AtomicUsize::new(0));
        let resolver = resolver(
            FakeExtractor::ok(Arc::clone(&calls), Duration::from_millis(150)),
            4,
            ResolverConfig::default(),
        );

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let resolver = resolver.clone();
                tokio::spawn(async move { resolver.resolve("https://youtu.be/abc").await })
            })
            .collect();

        let mut results = Vec::new();
        for task in tasks {
            results.push(task.await.unwrap().unwrap());
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(results.windows(2).all(|pair| pair[0] == pair[1]));
    }

    #[tokio::test]
    async fn test_failure_reaches_every_waiter() {
        let calls = Arc::new(AtomicUsize::new(0));
        let extractor = FakeExtractor::with(
            Arc::clone(&calls),
            Duration::from_millis(100),
            Box::new(|_| Err(Error::ExtractionFailed("no formats found".into()))),
        );
        let resolver = resolver(extractor, 4, ResolverConfig::default());

        let tasks: Vec<_> = (0..4)
            .map(|_| {
                let resolver = resolver.clone();
                tokio::spawn(async move { resolver.resolve("https://youtu.be/abc").await })
            })
            .collect();

        for task in tasks {
            let err = task.await.unwrap().unwrap_err();
            assert!(matches!(err, Error::ExtractionFailed(_)));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let calls = Arc::new(AtomicUsize::new(0));
        let extractor = FakeExtractor::with(
            Arc::clone(&calls),
            Duration::ZERO,
            Box::new(|_| Err(Error::ExtractionFailed("no formats found".into()))),
        );
        let resolver = resolver(extractor, 2, ResolverConfig::default());

        assert!(resolver.resolve("https://youtu.be/abc").await.is_err());
        assert!(resolver.resolve("https://youtu.be/abc").await.is_err());

        // No negative caching: each call ran the extractor again.
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_empty_extractor_output_is_a_failure() {
        let calls = Arc::new(AtomicUsize::new(0));
        let extractor = FakeExtractor::with(
            Arc::clone(&calls),
            Duration::ZERO,
            Box::new(|_| Ok(String::new())),
        );
        let resolver = resolver(extractor, 2, ResolverConfig::default());

        let err = resolver.resolve("https://youtu.be/abc").await.unwrap_err();
        assert!(matches!(err, Error::ExtractionFailed(_)));

        // And nothing was cached.
        resolver.resolve("https://youtu.be/abc").await.unwrap_err();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_slow_extraction_times_out() {
        let calls = Arc::new(AtomicUsize::new(0));
        let config = ResolverConfig {
            extract_timeout: Duration::from_millis(40),
            ..ResolverConfig::default()
        };
        let resolver = resolver(
            FakeExtractor::ok(Arc::clone(&calls), Duration::from_millis(300)),
            2,
            config,
        );

        let err = resolver.resolve("https://youtu.be/abc").await.unwrap_err();
        assert!(matches!(err, Error::Timeout(_)));
    }

    #[tokio::test]
    async fn test_distinct_keys_extract_concurrently() {
        let calls = Arc::new(AtomicUsize::new(0));
        // Both extractions must be inside the extractor at once for the
        // barrier to release; a serialized resolver would hang here.
        let barrier = Arc::new(Barrier::new(2));
        let extractor = FakeExtractor::with(
            Arc::clone(&calls),
            Duration::ZERO,
            Box::new(move |url| {
                barrier.wait();
                Ok(format!("https://cdn.example/{url}"))
            }),
        );
        let resolver = resolver(extractor, 2, ResolverConfig::default());

        let a = {
            let resolver = resolver.clone();
            tokio::spawn(async move { resolver.resolve("https://youtu.be/a").await })
        };
        let b = {
            let resolver = resolver.clone();
            tokio::spawn(async move { resolver.resolve("https://youtu.be/b").await })
        };

        assert!(a.await.unwrap().is_ok());
        assert!(b.await.unwrap().is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_extraction_survives_cancelled_caller() {
        let calls = Arc::new(AtomicUsize::new(0));
        let resolver = resolver(
            FakeExtractor::ok(Arc::clone(&calls), Duration::from_millis(80)),
            2,
            ResolverConfig::default(),
        );

        let task = {
            let resolver = resolver.clone();
            tokio::spawn(async move { resolver.resolve("https://youtu.be/abc").await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        task.abort();

        // The detached extraction completes and populates the cache anyway.
        tokio::time::sleep(Duration::from_millis(120)).await;
        resolver.resolve("https://youtu.be/abc").await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
