use parking_lot::Mutex;
use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

struct Entry<V> {
    value: V,
    expires_at: Instant,
    seq: u64,
}

struct Inner<K, V> {
    entries: HashMap<K, Entry<V>>,
    next_seq: u64,
}

/// Capacity-bounded map with per-entry TTL.
///
/// Expiration is lazy: an expired entry is removed by the `get` that observes
/// it. When inserting a new key at capacity, the entry with the soonest expiry
/// is evicted first; ties fall back to insertion order (oldest first). Both
/// rules are deterministic.
///
/// Keys are compared byte-for-byte; the cache applies no normalization.
/// Thread-safe behind a single mutex.
pub struct TtlCache<K, V> {
    capacity: usize,
    inner: Mutex<Inner<K, V>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "cache capacity must be at least 1");
        Self {
            capacity,
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                next_seq: 0,
            }),
        }
    }

    /// Look up a live entry. An entry whose expiry has passed is removed here
    /// and reported as absent.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = Instant::now();
        let mut inner = self.inner.lock();
        match inner.entries.get(key) {
            Some(entry) if entry.expires_at > now => Some(entry.value.clone()),
            Some(_) => {
                inner.entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Insert or overwrite an entry with `expires_at = now + ttl`.
    ///
    /// Overwrites replace the entry wholesale, expiry included. A new key at
    /// capacity evicts exactly one victim first; already-expired entries sort
    /// as the soonest expiry, so they go before live ones.
    pub fn insert(&self, key: K, value: V, ttl: Duration) {
        let expires_at = Instant::now() + ttl;
        let mut inner = self.inner.lock();
        if inner.entries.len() >= self.capacity && !inner.entries.contains_key(&key) {
            let victim = inner
                .entries
                .iter()
                .min_by_key(|(_, entry)| (entry.expires_at, entry.seq))
                .map(|(k, _)| k.clone());
            if let Some(victim) = victim {
                inner.entries.remove(&victim);
            }
        }
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.entries.insert(
            key,
            Entry {
                value,
                expires_at,
                seq,
            },
        );
    }

    /// Number of stored entries, counting expired ones not yet collected by a
    /// `get`.
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
