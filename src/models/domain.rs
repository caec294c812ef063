use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::error::MatchError;

/// Allowed drift of the weight sum away from 1.0
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Immutable roommate profile snapshot
///
/// Every attribute besides the identity is optional. The profile store owns
/// the lifecycle; the engine only ever borrows a snapshot for one computation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileSnapshot {
    pub user_id: String,
    /// Bumped by the profile store on every mutation
    pub revision: u64,
    pub budget_min: Option<f64>,
    pub budget_max: Option<f64>,
    pub lifestyle: Option<String>,
    pub cleanliness: Option<String>,
    pub room_type: Option<String>,
    pub apartment_type: Option<String>,
    pub preferred_location: Option<String>,
    pub smoking_allowed: Option<bool>,
    pub pet_friendly: Option<bool>,
    pub guests_allowed: Option<bool>,
    pub available_from: Option<NaiveDate>,
    pub available_until: Option<NaiveDate>,
    pub min_stay_months: Option<u32>,
    pub max_stay_months: Option<u32>,
}

impl ProfileSnapshot {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            ..Default::default()
        }
    }

    pub fn with_revision(mut self, revision: u64) -> Self {
        self.revision = revision;
        self
    }
}

/// A scoring dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Budget,
    Lifestyle,
    Cleanliness,
    Smoking,
    Pets,
    Guests,
    Location,
    Availability,
    StayDuration,
    HousingType,
}

impl Dimension {
    /// Every dimension, in breakdown order
    pub const ALL: [Dimension; 10] = [
        Dimension::Budget,
        Dimension::Lifestyle,
        Dimension::Cleanliness,
        Dimension::Smoking,
        Dimension::Pets,
        Dimension::Guests,
        Dimension::Location,
        Dimension::Availability,
        Dimension::StayDuration,
        Dimension::HousingType,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Dimension::Budget => "budget",
            Dimension::Lifestyle => "lifestyle",
            Dimension::Cleanliness => "cleanliness",
            Dimension::Smoking => "smoking",
            Dimension::Pets => "pets",
            Dimension::Guests => "guests",
            Dimension::Location => "location",
            Dimension::Availability => "availability",
            Dimension::StayDuration => "stay_duration",
            Dimension::HousingType => "housing_type",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.name() == name)
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Scoring weights
///
/// Fixed configuration. Build through [`ScoringWeights::validated`] or
/// [`ScoringWeights::from_map`] so the sum-to-one invariant is checked.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub budget: f64,
    pub lifestyle: f64,
    pub cleanliness: f64,
    pub smoking: f64,
    pub pets: f64,
    pub guests: f64,
    pub location: f64,
    pub availability: f64,
    pub stay_duration: f64,
    pub housing_type: f64,
}

impl ScoringWeights {
    pub fn get(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::Budget => self.budget,
            Dimension::Lifestyle => self.lifestyle,
            Dimension::Cleanliness => self.cleanliness,
            Dimension::Smoking => self.smoking,
            Dimension::Pets => self.pets,
            Dimension::Guests => self.guests,
            Dimension::Location => self.location,
            Dimension::Availability => self.availability,
            Dimension::StayDuration => self.stay_duration,
            Dimension::HousingType => self.housing_type,
        }
    }

    fn slot(&mut self, dimension: Dimension) -> &mut f64 {
        match dimension {
            Dimension::Budget => &mut self.budget,
            Dimension::Lifestyle => &mut self.lifestyle,
            Dimension::Cleanliness => &mut self.cleanliness,
            Dimension::Smoking => &mut self.smoking,
            Dimension::Pets => &mut self.pets,
            Dimension::Guests => &mut self.guests,
            Dimension::Location => &mut self.location,
            Dimension::Availability => &mut self.availability,
            Dimension::StayDuration => &mut self.stay_duration,
            Dimension::HousingType => &mut self.housing_type,
        }
    }

    pub fn sum(&self) -> f64 {
        Dimension::ALL.iter().map(|d| self.get(*d)).sum()
    }

    /// Check that every weight is finite and non-negative and that they sum to 1.0
    pub fn validated(self) -> Result<Self, MatchError> {
        for dimension in Dimension::ALL {
            let weight = self.get(dimension);
            if !weight.is_finite() || weight < 0.0 {
                return Err(MatchError::invalid_argument(format!(
                    "weight for '{}' must be a finite non-negative number, got {}",
                    dimension, weight
                )));
            }
        }

        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(MatchError::invalid_argument(format!(
                "scoring weights must sum to 1.0, got {:.6}",
                sum
            )));
        }

        Ok(self)
    }

    /// Build weights from a dimension name -> weight mapping
    ///
    /// Every dimension must be named exactly once; unknown names are rejected.
    pub fn from_map(weights: &HashMap<String, f64>) -> Result<Self, MatchError> {
        let mut result = Self::zero();
        for (name, weight) in weights {
            let dimension = Dimension::from_name(name).ok_or_else(|| {
                MatchError::invalid_argument(format!("unknown scoring dimension '{}'", name))
            })?;
            *result.slot(dimension) = *weight;
        }

        if let Some(missing) = Dimension::ALL
            .iter()
            .find(|d| !weights.contains_key(d.name()))
        {
            return Err(MatchError::invalid_argument(format!(
                "missing weight for dimension '{}'",
                missing
            )));
        }

        result.validated()
    }

    fn zero() -> Self {
        Self {
            budget: 0.0,
            lifestyle: 0.0,
            cleanliness: 0.0,
            smoking: 0.0,
            pets: 0.0,
            guests: 0.0,
            location: 0.0,
            availability: 0.0,
            stay_duration: 0.0,
            housing_type: 0.0,
        }
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            budget: 0.20,
            lifestyle: 0.12,
            cleanliness: 0.10,
            smoking: 0.10,
            pets: 0.08,
            guests: 0.05,
            location: 0.12,
            availability: 0.10,
            stay_duration: 0.06,
            housing_type: 0.07,
        }
    }
}
