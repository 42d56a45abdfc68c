use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use crate::{Embedder, Embedding, EmbeddingError};

/// Memoizing wrapper keyed by the exact input text.
///
/// Encoders are pure, so the memo only saves recomputation. Errors are never cached.
pub struct CachedEmbedder<E> {
    inner: E,
    cache: Option<Mutex<LruCache<String, Embedding>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<E: Embedder> CachedEmbedder<E> {
    /// Wrap `inner` with room for `capacity` texts. A capacity of `0` disables memoization.
    pub fn new(inner: E, capacity: usize) -> Self {
        let cache = NonZeroUsize::new(capacity).map(|cap| Mutex::new(LruCache::new(cap)));
        Self {
            inner,
            cache,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }
}

impl<E: Embedder> Embedder for CachedEmbedder<E> {
    fn dim(&self) -> usize {
        self.inner.dim()
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }

    fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        let Some(cache) = self.cache.as_ref() else {
            return self.inner.embed(text);
        };

        {
            let mut guard = cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            if let Some(hit) = guard.get(text) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Ok(hit.clone());
            }
        }

        // Computed outside the lock; a concurrent miss on the same text just inserts twice.
        self.misses.fetch_add(1, Ordering::Relaxed);
        let embedding = self.inner.embed(text)?;
        cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .put(text.to_string(), embedding.clone());
        tracing::trace!(text_len = text.len(), "memoized embedding");
        Ok(embedding)
    }
}
