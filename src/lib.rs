//! Roommate Match - compatibility matching engine for the rental marketplace
//!
//! This library scores every (user, candidate) pair across ten weighted
//! dimensions and returns the top-N candidates for a user. Pair scores are
//! memoized per profile revision and ranking runs on a bounded worker pool.

pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use crate::core::{calculate_compatibility, date_overlap, Matcher, ScoreCache};
pub use error::{MatchError, MatchResult};
pub use models::{CompatibilityScore, Dimension, MatchResultSet, ProfileSnapshot, ScoringWeights};
pub use services::{InMemoryProfileStore, MatchEngine, ProfileProvider};
