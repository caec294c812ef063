use moka::policy::EvictionPolicy;
use moka::sync::Cache;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;

use crate::core::features::{FeatureExtractor, FeatureVector};
use crate::models::{CompatibilityScore, ProfileSnapshot};

/// Errors that can occur with cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache unavailable")]
    Unavailable,

    #[error("Invalidation failed: {0}")]
    Invalidation(String),
}

/// Canonical cache key for an unordered pair of profile revisions
///
/// The side with the lower identity is always stored first, so (A, B) and
/// (B, A) resolve to the same entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PairKey {
    low: (String, u64),
    high: (String, u64),
}

impl PairKey {
    pub fn new(id_a: &str, rev_a: u64, id_b: &str, rev_b: u64) -> Self {
        let a = (id_a.to_string(), rev_a);
        let b = (id_b.to_string(), rev_b);
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }

    pub fn involves(&self, user_id: &str) -> bool {
        self.low.0 == user_id || self.high.0 == user_id
    }
}

/// Memoizes pairwise compatibility scores
///
/// Bounded LRU keyed by [`PairKey`]. Concurrent requests for one key share a
/// single computation; distinct keys never contend on a global lock. Entries
/// for outdated revisions are never read again and age out of the LRU.
pub struct ScoreCache {
    entries: Option<Cache<PairKey, Arc<CompatibilityScore>>>,
    available: AtomicBool,
    hits: AtomicU64,
    computations: AtomicU64,
}

impl ScoreCache {
    /// Create a cache holding at most `max_entries` scores; 0 disables caching
    pub fn new(max_entries: u64) -> Self {
        let entries = (max_entries > 0).then(|| {
            Cache::builder()
                .max_capacity(max_entries)
                .eviction_policy(EvictionPolicy::lru())
                .support_invalidation_closures()
                .build()
        });

        Self {
            entries,
            available: AtomicBool::new(true),
            hits: AtomicU64::new(0),
            computations: AtomicU64::new(0),
        }
    }

    pub fn disabled() -> Self {
        Self::new(0)
    }

    /// Take the cache out of (or back into) service
    ///
    /// While unavailable every lookup falls through to direct computation.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::Release);
    }

    fn live(&self) -> Result<&Cache<PairKey, Arc<CompatibilityScore>>, CacheError> {
        match &self.entries {
            Some(cache) if self.available.load(Ordering::Acquire) => Ok(cache),
            _ => Err(CacheError::Unavailable),
        }
    }

    /// Return the cached score for the pair or compute it once
    pub fn get_or_compute<F>(
        &self,
        id_a: &str,
        rev_a: u64,
        id_b: &str,
        rev_b: u64,
        compute: F,
    ) -> Arc<CompatibilityScore>
    where
        F: FnOnce() -> CompatibilityScore,
    {
        let cache = match self.live() {
            Ok(cache) => cache,
            Err(e) => {
                tracing::debug!("{}, scoring {} / {} directly", e, id_a, id_b);
                self.computations.fetch_add(1, Ordering::Relaxed);
                return Arc::new(compute());
            }
        };

        let key = PairKey::new(id_a, rev_a, id_b, rev_b);
        let mut computed = false;
        let score = cache.get_with(key, || {
            computed = true;
            self.computations.fetch_add(1, Ordering::Relaxed);
            Arc::new(compute())
        });

        if !computed {
            tracing::trace!("Score cache hit: {} / {}", id_a, id_b);
            self.hits.fetch_add(1, Ordering::Relaxed);
        }

        score
    }

    /// Cached score for the pair at these revisions, if any
    pub fn get(&self, id_a: &str, rev_a: u64, id_b: &str, rev_b: u64) -> Option<Arc<CompatibilityScore>> {
        self.live()
            .ok()?
            .get(&PairKey::new(id_a, rev_a, id_b, rev_b))
    }

    /// Drop every entry involving a user, whatever the revision
    pub fn invalidate_user(&self, user_id: &str) -> Result<(), CacheError> {
        let cache = self.live()?;
        let user_id = user_id.to_string();
        cache
            .invalidate_entries_if(move |key, _| key.involves(&user_id))
            .map_err(|e| CacheError::Invalidation(e.to_string()))?;
        Ok(())
    }

    /// Apply pending evictions and invalidations
    pub fn run_pending_tasks(&self) {
        if let Some(cache) = &self.entries {
            cache.run_pending_tasks();
        }
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.as_ref().map_or(0, |c| c.entry_count()),
            hits: self.hits.load(Ordering::Relaxed),
            computations: self.computations.load(Ordering::Relaxed),
        }
    }
}

impl Default for ScoreCache {
    fn default() -> Self {
        Self::new(10_000)
    }
}

/// Cache statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub entries: u64,
    pub hits: u64,
    /// Underlying score computations, including ones that bypassed the cache
    pub computations: u64,
}

/// Memoizes feature vectors by (identity, revision)
pub struct FeatureCache {
    entries: Option<Cache<(String, u64), Arc<FeatureVector>>>,
}

impl FeatureCache {
    pub fn new(max_entries: u64) -> Self {
        let entries = (max_entries > 0).then(|| {
            Cache::builder()
                .max_capacity(max_entries)
                .eviction_policy(EvictionPolicy::lru())
                .build()
        });
        Self { entries }
    }

    pub fn get_or_extract(
        &self,
        profile: &ProfileSnapshot,
        extractor: &FeatureExtractor,
    ) -> Arc<FeatureVector> {
        match &self.entries {
            Some(cache) => cache.get_with((profile.user_id.clone(), profile.revision), || {
                Arc::new(extractor.extract(profile))
            }),
            None => Arc::new(extractor.extract(profile)),
        }
    }
}
