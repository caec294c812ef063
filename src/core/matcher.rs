use parking_lot::Mutex;
use rayon::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::config::Settings;
use crate::core::{
    cache::{FeatureCache, ScoreCache},
    features::{FeatureExtractor, FeatureVector},
    scoring::calculate_compatibility,
    top_k::TopK,
};
use crate::error::{MatchError, MatchResult};
use crate::models::{
    CompatibilityScore, Diagnostic, MatchResultSet, ProfileSnapshot, RankedMatch, ScoringWeights,
};

/// Main ranking orchestrator
///
/// # Pipeline Stages
/// 1. Admission: drop the requester, blank identities and duplicates
/// 2. Scoring: cached pairwise scores computed in parallel on the current rayon pool
/// 3. Ranking: bounded best-K heap, drained best-first
///
/// Cloning is cheap; clones share the caches.
#[derive(Clone)]
pub struct Matcher {
    weights: ScoringWeights,
    extractor: Arc<FeatureExtractor>,
    scores: Arc<ScoreCache>,
    features: Arc<FeatureCache>,
}

impl Matcher {
    pub fn new(weights: ScoringWeights, extractor: FeatureExtractor, scores: ScoreCache) -> Self {
        Self {
            weights,
            extractor: Arc::new(extractor),
            scores: Arc::new(scores),
            features: Arc::new(FeatureCache::new(10_000)),
        }
    }

    pub fn with_default_weights() -> Self {
        Self::new(
            ScoringWeights::default(),
            FeatureExtractor::default(),
            ScoreCache::default(),
        )
    }

    /// Build a matcher from validated settings
    pub fn from_settings(settings: &Settings) -> MatchResult<Self> {
        let weights = ScoringWeights::try_from(&settings.scoring.weights)?;
        let extractor = FeatureExtractor::new(&settings.features)?;

        Ok(Self {
            weights,
            extractor: Arc::new(extractor),
            scores: Arc::new(ScoreCache::new(settings.cache.max_entries)),
            features: Arc::new(FeatureCache::new(settings.cache.feature_entries)),
        })
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    pub fn score_cache(&self) -> &ScoreCache {
        &self.scores
    }

    /// Rank a candidate pool for a user
    ///
    /// # Arguments
    /// * `user` - The requesting user's profile
    /// * `pool` - Candidate profiles; the requester is skipped if present
    /// * `top_n` - Maximum number of matches to return, at least 1
    /// * `cancel` - Checked before each candidate is scored
    ///
    /// # Returns
    /// MatchResultSet ordered by descending score, ties by ascending identity
    pub fn rank(
        &self,
        user: &ProfileSnapshot,
        pool: &[ProfileSnapshot],
        top_n: usize,
        cancel: &CancellationToken,
    ) -> MatchResult<MatchResultSet> {
        if top_n < 1 {
            return Err(MatchError::invalid_argument("top_n must be at least 1"));
        }
        self.extractor
            .check(user)
            .map_err(|e| MatchError::invalid_argument(e.to_string()))?;
        if cancel.is_cancelled() {
            return Err(MatchError::Cancelled);
        }

        let user_features = self.features.get_or_extract(user, &self.extractor);

        // Stage 1: admission
        let mut diagnostics = Vec::new();
        let mut seen: HashSet<&str> = HashSet::with_capacity(pool.len());
        let mut admitted: Vec<&ProfileSnapshot> = Vec::with_capacity(pool.len());
        for candidate in pool {
            if candidate.user_id == user.user_id {
                continue;
            }
            if let Err(e) = self.extractor.check(candidate) {
                tracing::warn!("Skipping candidate: {}", e);
                diagnostics.push(Diagnostic {
                    user_id: candidate.user_id.clone(),
                    reason: e.to_string(),
                });
                continue;
            }
            if !seen.insert(candidate.user_id.as_str()) {
                tracing::warn!("Skipping duplicate candidate {}", candidate.user_id);
                diagnostics.push(Diagnostic {
                    user_id: candidate.user_id.clone(),
                    reason: "duplicate candidate in pool".to_string(),
                });
                continue;
            }
            admitted.push(candidate);
        }

        // Stages 2 & 3: score in parallel, accumulate into the shared heap
        let best = Mutex::new(TopK::new(top_n));
        admitted.par_iter().try_for_each(|candidate| {
            if cancel.is_cancelled() {
                return Err(MatchError::Cancelled);
            }

            let score = self.score_against(user, &user_features, candidate);
            best.lock().offer(&candidate.user_id, score);
            Ok(())
        })?;

        let matches = best
            .into_inner()
            .into_sorted_vec()
            .into_iter()
            .map(|scored| RankedMatch {
                user_id: scored.user_id,
                score: scored.score.total,
                breakdown: scored.score.breakdown.clone(),
            })
            .collect();

        Ok(MatchResultSet {
            user_id: user.user_id.clone(),
            top_n,
            matches,
            diagnostics,
            candidates_considered: admitted.len(),
        })
    }

    /// Direct two-party comparison through the same cache and scorer path
    pub fn score_pair(
        &self,
        a: &ProfileSnapshot,
        b: &ProfileSnapshot,
    ) -> MatchResult<CompatibilityScore> {
        self.extractor.check(a)?;
        self.extractor.check(b)?;

        let a_features = self.features.get_or_extract(a, &self.extractor);
        Ok(self.score_against(a, &a_features, b).as_ref().clone())
    }

    fn score_against(
        &self,
        user: &ProfileSnapshot,
        user_features: &FeatureVector,
        candidate: &ProfileSnapshot,
    ) -> Arc<CompatibilityScore> {
        self.scores.get_or_compute(
            &user.user_id,
            user.revision,
            &candidate.user_id,
            candidate.revision,
            || {
                let candidate_features = self.features.get_or_extract(candidate, &self.extractor);
                calculate_compatibility(user_features, &candidate_features, &self.weights)
            },
        )
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_default_weights()
    }
}
