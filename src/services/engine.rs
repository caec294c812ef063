use dashmap::DashMap;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::config::{MatchingSettings, Settings};
use crate::core::{CacheStats, Matcher};
use crate::error::{MatchError, MatchResult};
use crate::models::{CompatibilityScore, MatchResultSet, ProfileSnapshot};
use crate::services::profiles::ProfileProvider;

#[derive(Debug, Clone)]
struct InFlight {
    generation: u64,
    token: CancellationToken,
}

/// Registration of one in-flight ranking request
///
/// Dropping it cancels the request (completion, caller going away, or a
/// superseding request) and clears the registry slot if it is still ours.
struct InFlightGuard {
    registry: Arc<DashMap<String, InFlight>>,
    user_id: String,
    generation: u64,
    token: CancellationToken,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.token.cancel();
        self.registry
            .remove_if(&self.user_id, |_, flight| flight.generation == self.generation);
    }
}

/// Asynchronous matching service
///
/// Owns the profile provider, the shared caches and a bounded scoring pool.
/// Each call presents a single completion point; the scoring itself runs on
/// the rayon pool and never blocks the async runtime.
#[derive(Clone)]
pub struct MatchEngine {
    matcher: Matcher,
    provider: Arc<dyn ProfileProvider>,
    workers: Arc<ThreadPool>,
    in_flight: Arc<DashMap<String, InFlight>>,
    generation: Arc<AtomicU64>,
    settings: MatchingSettings,
}

impl MatchEngine {
    /// Build an engine from settings, failing on any misconfiguration
    pub fn new(settings: &Settings, provider: Arc<dyn ProfileProvider>) -> MatchResult<Self> {
        settings.validate()?;
        let matcher = Matcher::from_settings(settings)?;
        Self::with_matcher(matcher, provider, settings.matching.clone())
    }

    pub fn with_matcher(
        matcher: Matcher,
        provider: Arc<dyn ProfileProvider>,
        settings: MatchingSettings,
    ) -> MatchResult<Self> {
        let threads = settings.workers.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
        });

        let workers = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("match-worker-{}", i))
            .build()
            .map_err(|e| MatchError::WorkerPool(e.to_string()))?;

        tracing::info!("Match engine initialized with {} workers", threads);

        Ok(Self {
            matcher,
            provider,
            workers: Arc::new(workers),
            in_flight: Arc::new(DashMap::new()),
            generation: Arc::new(AtomicU64::new(0)),
            settings,
        })
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.matcher.score_cache().stats()
    }

    /// Number of ranking requests currently registered
    pub fn in_flight_requests(&self) -> usize {
        self.in_flight.len()
    }

    /// Rank the user's candidate pool from the profile provider
    pub async fn find_matches(
        &self,
        user_id: &str,
        top_n: Option<usize>,
    ) -> MatchResult<MatchResultSet> {
        let pool = self.provider.candidate_pool(user_id);
        tracing::debug!("Fetched {} candidates for {}", pool.len(), user_id);

        let top_n = top_n.unwrap_or(self.settings.default_top_n);
        self.rank(user_id, pool, top_n).await
    }

    /// Rank a supplied candidate pool for a user
    pub async fn rank(
        &self,
        user_id: &str,
        pool: Vec<ProfileSnapshot>,
        top_n: usize,
    ) -> MatchResult<MatchResultSet> {
        self.rank_with_cancel(user_id, pool, top_n, CancellationToken::new())
            .await
    }

    /// Rank with an external cancellation signal
    ///
    /// A newer request for the same user cancels this one. Dropping the
    /// returned future cancels it as well. Scores cached before cancellation
    /// remain valid.
    pub async fn rank_with_cancel(
        &self,
        user_id: &str,
        pool: Vec<ProfileSnapshot>,
        top_n: usize,
        cancel: CancellationToken,
    ) -> MatchResult<MatchResultSet> {
        if top_n < 1 {
            return Err(MatchError::invalid_argument("top_n must be at least 1"));
        }
        let top_n = if top_n > self.settings.max_top_n {
            tracing::debug!("Capping top_n {} at {}", top_n, self.settings.max_top_n);
            self.settings.max_top_n
        } else {
            top_n
        };

        let user = self
            .provider
            .profile(user_id)
            .ok_or_else(|| MatchError::ProfileNotFound(user_id.to_string()))?;

        let guard = self.begin_request(user_id, &cancel);
        let token = guard.token.clone();
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!("rank", %request_id, user_id = %user_id, top_n);

        let matcher = self.matcher.clone();
        let result = self
            .run_on_workers(move || {
                let _entered = span.enter();
                matcher.rank(&user, &pool, top_n, &token)
            })
            .await?;
        drop(guard);

        match &result {
            Ok(set) => tracing::info!(
                %request_id,
                "Returning {} matches for user {} (from {} candidates, {} skipped)",
                set.matches.len(),
                user_id,
                set.candidates_considered,
                set.diagnostics.len()
            ),
            Err(e) => tracing::debug!(%request_id, "Ranking for {} ended: {}", user_id, e),
        }

        result
    }

    /// Score two profiles directly
    pub async fn score_pair(&self, id_a: &str, id_b: &str) -> MatchResult<CompatibilityScore> {
        let a = self
            .provider
            .profile(id_a)
            .ok_or_else(|| MatchError::ProfileNotFound(id_a.to_string()))?;
        let b = self
            .provider
            .profile(id_b)
            .ok_or_else(|| MatchError::ProfileNotFound(id_b.to_string()))?;

        let matcher = self.matcher.clone();
        self.run_on_workers(move || matcher.score_pair(&a, &b))
            .await?
    }

    /// Register a request for `user_id`, cancelling any older one
    fn begin_request(&self, user_id: &str, cancel: &CancellationToken) -> InFlightGuard {
        let generation = self.generation.fetch_add(1, Ordering::Relaxed);
        let token = cancel.child_token();

        let previous = self.in_flight.insert(
            user_id.to_string(),
            InFlight {
                generation,
                token: token.clone(),
            },
        );
        if let Some(previous) = previous {
            tracing::debug!("Superseding in-flight ranking for {}", user_id);
            previous.token.cancel();
        }

        InFlightGuard {
            registry: Arc::clone(&self.in_flight),
            user_id: user_id.to_string(),
            generation,
            token,
        }
    }

    /// Run a job on the scoring pool and await its single result
    async fn run_on_workers<T, F>(&self, job: F) -> MatchResult<T>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        self.workers.spawn(move || {
            let _ = tx.send(job());
        });

        rx.await
            .map_err(|_| MatchError::WorkerPool("scoring worker exited without a result".to_string()))
    }
}
