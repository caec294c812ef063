// Model exports
pub mod domain;
pub mod results;

pub use domain::{Dimension, ProfileSnapshot, ScoringWeights, WEIGHT_SUM_TOLERANCE};
pub use results::{CompatibilityScore, Diagnostic, DimensionScore, MatchResultSet, RankedMatch};
