// Core algorithm exports
pub mod cache;
pub mod features;
pub mod matcher;
pub mod overlap;
pub mod scoring;
pub mod top_k;

pub use cache::{CacheError, CacheStats, FeatureCache, PairKey, ScoreCache};
pub use features::{Feature, FeatureExtractor, FeatureVector, NEUTRAL_SCORE};
pub use matcher::Matcher;
pub use overlap::{date_overlap, DateWindow};
pub use scoring::calculate_compatibility;
pub use top_k::TopK;
