use serde::{Deserialize, Serialize};

use crate::models::domain::Dimension;

/// One dimension's share of a compatibility score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionScore {
    pub dimension: Dimension,
    /// Unweighted similarity in [0, 1]
    pub similarity: f64,
    pub weight: f64,
    /// `similarity * weight`
    pub contribution: f64,
}

/// Compatibility between two profiles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompatibilityScore {
    /// Weighted total in [0, 1]
    pub total: f64,
    pub breakdown: Vec<DimensionScore>,
}

impl CompatibilityScore {
    pub fn dimension(&self, dimension: Dimension) -> Option<&DimensionScore> {
        self.breakdown.iter().find(|d| d.dimension == dimension)
    }

    pub fn similarity(&self, dimension: Dimension) -> Option<f64> {
        self.dimension(dimension).map(|d| d.similarity)
    }

    pub fn contribution_sum(&self) -> f64 {
        self.breakdown.iter().map(|d| d.contribution).sum()
    }
}

/// Ranked candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedMatch {
    pub user_id: String,
    pub score: f64,
    pub breakdown: Vec<DimensionScore>,
}

/// A candidate that was skipped during ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub user_id: String,
    pub reason: String,
}

/// Ordered top-N result of a ranking request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResultSet {
    pub user_id: String,
    pub top_n: usize,
    /// Descending by score, ties by ascending candidate id
    pub matches: Vec<RankedMatch>,
    pub diagnostics: Vec<Diagnostic>,
    pub candidates_considered: usize,
}

impl MatchResultSet {
    pub fn candidate_ids(&self) -> Vec<&str> {
        self.matches.iter().map(|m| m.user_id.as_str()).collect()
    }
}
