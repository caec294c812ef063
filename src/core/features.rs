use crate::config::FeaturesConfig;
use crate::core::overlap::DateWindow;
use crate::error::MatchError;
use crate::models::ProfileSnapshot;

/// Similarity reported when either side of a comparison is unknown
pub const NEUTRAL_SCORE: f64 = 0.5;

/// Three-state attribute: unset, or set to a normalized value
///
/// Comparisons go through [`Feature::compare_with`], which returns
/// [`NEUTRAL_SCORE`] unless both sides are set.
#[derive(Debug, Clone, PartialEq)]
pub enum Feature<T> {
    Unset,
    Set(T),
}

impl<T> Feature<T> {
    pub fn from_option(value: Option<T>) -> Self {
        match value {
            Some(v) => Feature::Set(v),
            None => Feature::Unset,
        }
    }

    pub fn is_set(&self) -> bool {
        matches!(self, Feature::Set(_))
    }

    #[inline]
    pub fn compare_with<F>(&self, other: &Self, rule: F) -> f64
    where
        F: FnOnce(&T, &T) -> f64,
    {
        match (self, other) {
            (Feature::Set(a), Feature::Set(b)) => rule(a, b),
            _ => NEUTRAL_SCORE,
        }
    }
}

/// Closed interval scaled into [0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub lo: f64,
    pub hi: f64,
}

impl Interval {
    fn is_point(&self) -> bool {
        self.hi <= self.lo
    }

    fn contains(&self, value: f64) -> bool {
        self.lo <= value && value <= self.hi
    }

    /// Intersection length over union length
    ///
    /// A single value (zero width) scores 1.0 when it lies inside the other
    /// interval, bounds included, and 0.0 otherwise. Two proper ranges that are
    /// disjoint or merely touching score 0.0.
    #[inline]
    pub fn overlap_ratio(&self, other: &Interval) -> f64 {
        let point_inside = match (self.is_point(), other.is_point()) {
            (true, _) => Some(other.contains(self.lo)),
            (false, true) => Some(self.contains(other.lo)),
            (false, false) => None,
        };
        if let Some(inside) = point_inside {
            return if inside { 1.0 } else { 0.0 };
        }

        let intersection = self.hi.min(other.hi) - self.lo.max(other.lo);
        let union = self.hi.max(other.hi) - self.lo.min(other.lo);

        if intersection <= 0.0 || union <= 0.0 {
            return 0.0;
        }

        (intersection / union).clamp(0.0, 1.0)
    }
}

/// Normalized categorical value
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub label: String,
    /// Position on the configured ordinal scale, when the label is on it
    pub position: Option<f64>,
}

impl Category {
    /// `1 - distance` on the ordinal scale, exact match otherwise
    #[inline]
    pub fn similarity(&self, other: &Category) -> f64 {
        match (self.position, other.position) {
            (Some(a), Some(b)) => 1.0 - (a - b).abs(),
            _ => exact_match(&self.label, &other.label),
        }
    }
}

#[inline]
pub fn exact_match<T: PartialEq + ?Sized>(a: &T, b: &T) -> f64 {
    if a == b {
        1.0
    } else {
        0.0
    }
}

/// Canonical, bounded representation of a profile used only for scoring
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    pub user_id: String,
    pub revision: u64,
    pub budget: Feature<Interval>,
    pub lifestyle: Feature<Category>,
    pub cleanliness: Feature<Category>,
    pub room_type: Feature<String>,
    pub apartment_type: Feature<String>,
    pub location: Feature<String>,
    pub smoking: Feature<bool>,
    pub pets: Feature<bool>,
    pub guests: Feature<bool>,
    pub availability: DateWindow,
    pub stay: Feature<Interval>,
}

/// Ordered category labels, positions normalized to [0, 1]
#[derive(Debug, Clone)]
struct OrdinalScale {
    labels: Vec<String>,
}

impl OrdinalScale {
    fn new(labels: &[String]) -> Self {
        Self {
            labels: labels.iter().filter_map(|l| normalize_label(l)).collect(),
        }
    }

    fn position(&self, label: &str) -> Option<f64> {
        let index = self.labels.iter().position(|l| l == label)?;
        if self.labels.len() < 2 {
            return Some(0.0);
        }
        Some(index as f64 / (self.labels.len() - 1) as f64)
    }
}

/// Maps profile snapshots to feature vectors
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    budget_floor: f64,
    budget_ceiling: f64,
    stay_floor: f64,
    stay_ceiling: f64,
    lifestyle_scale: OrdinalScale,
    cleanliness_scale: OrdinalScale,
}

impl FeatureExtractor {
    /// Build an extractor, rejecting empty or inverted normalization ranges
    pub fn new(config: &FeaturesConfig) -> Result<Self, MatchError> {
        if !config.budget_floor.is_finite()
            || !config.budget_ceiling.is_finite()
            || config.budget_floor >= config.budget_ceiling
        {
            return Err(MatchError::invalid_argument(format!(
                "budget range must satisfy floor < ceiling, got {}..{}",
                config.budget_floor, config.budget_ceiling
            )));
        }
        if config.stay_floor_months >= config.stay_ceiling_months {
            return Err(MatchError::invalid_argument(format!(
                "stay range must satisfy floor < ceiling, got {}..{}",
                config.stay_floor_months, config.stay_ceiling_months
            )));
        }

        Ok(Self {
            budget_floor: config.budget_floor,
            budget_ceiling: config.budget_ceiling,
            stay_floor: config.stay_floor_months as f64,
            stay_ceiling: config.stay_ceiling_months as f64,
            lifestyle_scale: OrdinalScale::new(&config.lifestyle_scale),
            cleanliness_scale: OrdinalScale::new(&config.cleanliness_scale),
        })
    }

    /// Admission check run before a profile enters a ranking
    pub fn check(&self, profile: &ProfileSnapshot) -> Result<(), MatchError> {
        if profile.user_id.trim().is_empty() {
            return Err(MatchError::FeatureExtraction {
                user_id: profile.user_id.clone(),
                reason: "profile has no identity".to_string(),
            });
        }
        Ok(())
    }

    /// Extract a feature vector. Total: unset or unusable values become [`Feature::Unset`].
    pub fn extract(&self, profile: &ProfileSnapshot) -> FeatureVector {
        FeatureVector {
            user_id: profile.user_id.clone(),
            revision: profile.revision,
            budget: scale_range(
                profile.budget_min,
                profile.budget_max,
                self.budget_floor,
                self.budget_ceiling,
            ),
            lifestyle: self.category(&profile.lifestyle, &self.lifestyle_scale),
            cleanliness: self.category(&profile.cleanliness, &self.cleanliness_scale),
            room_type: label(&profile.room_type),
            apartment_type: label(&profile.apartment_type),
            location: label(&profile.preferred_location),
            smoking: Feature::from_option(profile.smoking_allowed),
            pets: Feature::from_option(profile.pet_friendly),
            guests: Feature::from_option(profile.guests_allowed),
            availability: DateWindow::new(profile.available_from, profile.available_until),
            stay: scale_range(
                profile.min_stay_months.map(f64::from),
                profile.max_stay_months.map(f64::from),
                self.stay_floor,
                self.stay_ceiling,
            ),
        }
    }

    fn category(&self, value: &Option<String>, scale: &OrdinalScale) -> Feature<Category> {
        Feature::from_option(value.as_deref().and_then(normalize_label).map(|label| {
            let position = scale.position(&label);
            Category { label, position }
        }))
    }
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        let config = FeaturesConfig::default();
        Self {
            budget_floor: config.budget_floor,
            budget_ceiling: config.budget_ceiling,
            stay_floor: config.stay_floor_months as f64,
            stay_ceiling: config.stay_ceiling_months as f64,
            lifestyle_scale: OrdinalScale::new(&config.lifestyle_scale),
            cleanliness_scale: OrdinalScale::new(&config.cleanliness_scale),
        }
    }
}

/// Trim, lowercase and join words with underscores; empty labels are unset
fn normalize_label(raw: &str) -> Option<String> {
    let words: Vec<String> = raw
        .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .collect();

    if words.is_empty() {
        None
    } else {
        Some(words.join("_"))
    }
}

fn label(value: &Option<String>) -> Feature<String> {
    Feature::from_option(value.as_deref().and_then(normalize_label))
}

/// Clamp a possibly one-sided range into `floor..=ceiling` and scale it to [0, 1]
fn scale_range(min: Option<f64>, max: Option<f64>, floor: f64, ceiling: f64) -> Feature<Interval> {
    let min = min.filter(|v| v.is_finite());
    let max = max.filter(|v| v.is_finite());
    if min.is_none() && max.is_none() {
        return Feature::Unset;
    }

    let lo = min.unwrap_or(floor).clamp(floor, ceiling);
    let hi = max.unwrap_or(ceiling).clamp(floor, ceiling);
    let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
    let span = ceiling - floor;

    Feature::Set(Interval {
        lo: (lo - floor) / span,
        hi: (hi - floor) / span,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> FeatureExtractor {
        FeatureExtractor::new(&FeaturesConfig::default()).unwrap()
    }

    #[test]
    fn test_empty_profile_is_all_unset() {
        let features = extractor().extract(&ProfileSnapshot::new("u1"));

        assert_eq!(features.budget, Feature::Unset);
        assert_eq!(features.lifestyle, Feature::Unset);
        assert_eq!(features.smoking, Feature::Unset);
        assert_eq!(features.stay, Feature::Unset);
        assert!(features.availability.is_unset());
    }

    #[test]
    fn test_budget_is_scaled() {
        let profile = ProfileSnapshot {
            budget_min: Some(500.0),
            budget_max: Some(800.0),
            ..ProfileSnapshot::new("u1")
        };
        let features = extractor().extract(&profile);

        assert_eq!(features.budget, Feature::Set(Interval { lo: 0.05, hi: 0.08 }));
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let profile = ProfileSnapshot {
            budget_min: Some(-200.0),
            budget_max: Some(50_000.0),
            max_stay_months: Some(120),
            ..ProfileSnapshot::new("u1")
        };
        let features = extractor().extract(&profile);

        assert_eq!(features.budget, Feature::Set(Interval { lo: 0.0, hi: 1.0 }));
        // one-sided stay: min defaults to the floor, max clamps to the ceiling
        assert_eq!(features.stay, Feature::Set(Interval { lo: 0.0, hi: 1.0 }));
    }

    #[test]
    fn test_inverted_and_non_finite_ranges() {
        let inverted = ProfileSnapshot {
            budget_min: Some(900.0),
            budget_max: Some(600.0),
            ..ProfileSnapshot::new("u1")
        };
        let features = extractor().extract(&inverted);
        assert_eq!(features.budget, Feature::Set(Interval { lo: 0.06, hi: 0.09 }));

        let nan = ProfileSnapshot {
            budget_min: Some(f64::NAN),
            ..ProfileSnapshot::new("u2")
        };
        assert_eq!(extractor().extract(&nan).budget, Feature::Unset);
    }

    #[test]
    fn test_categories_are_normalized() {
        let profile = ProfileSnapshot {
            lifestyle: Some("  Party ".to_string()),
            cleanliness: Some("Very Clean".to_string()),
            preferred_location: Some("Downtown".to_string()),
            room_type: Some("   ".to_string()),
            ..ProfileSnapshot::new("u1")
        };
        let features = extractor().extract(&profile);

        assert_eq!(
            features.lifestyle,
            Feature::Set(Category {
                label: "party".to_string(),
                position: Some(1.0)
            })
        );
        assert_eq!(
            features.cleanliness,
            Feature::Set(Category {
                label: "very_clean".to_string(),
                position: Some(1.0)
            })
        );
        assert_eq!(features.location, Feature::Set("downtown".to_string()));
        assert_eq!(features.room_type, Feature::Unset);
    }

    #[test]
    fn test_unknown_category_falls_back_to_exact_match() {
        let a = Category { label: "nocturnal".to_string(), position: None };
        let b = Category { label: "quiet".to_string(), position: Some(0.0) };

        assert_eq!(a.similarity(&a.clone()), 1.0);
        assert_eq!(a.similarity(&b), 0.0);
    }

    #[test]
    fn test_interval_overlap_ratio() {
        let a = Interval { lo: 0.0, hi: 0.4 };
        let b = Interval { lo: 0.2, hi: 0.6 };
        assert!((a.overlap_ratio(&b) - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(a.overlap_ratio(&b), b.overlap_ratio(&a));

        let far = Interval { lo: 0.7, hi: 0.9 };
        let point = Interval { lo: 0.3, hi: 0.3 };
        assert_eq!(point.overlap_ratio(&point), 1.0);

        // A single value inside the other range is a full match, bounds included
        let range = Interval { lo: 0.2, hi: 0.5 };
        assert_eq!(point.overlap_ratio(&range), 1.0);
        assert_eq!(range.overlap_ratio(&point), 1.0);
        assert_eq!(Interval { lo: 0.5, hi: 0.5 }.overlap_ratio(&range), 1.0);
        assert_eq!(point.overlap_ratio(&Interval { lo: 0.31, hi: 0.31 }), 0.0);
        assert_eq!(point.overlap_ratio(&far), 0.0);
        assert_eq!(far.overlap_ratio(&point), 0.0);
        assert_eq!(a.overlap_ratio(&far), 0.0);
    }

    #[test]
    fn test_unset_compares_neutral() {
        let set = Feature::Set(true);
        let unset: Feature<bool> = Feature::Unset;

        assert_eq!(set.compare_with(&unset, |a, b| exact_match(a, b)), NEUTRAL_SCORE);
        assert_eq!(unset.compare_with(&unset, |a, b| exact_match(a, b)), NEUTRAL_SCORE);
        assert_eq!(set.compare_with(&Feature::Set(false), |a, b| exact_match(a, b)), 0.0);
    }

    #[test]
    fn test_invalid_bounds_rejected() {
        let config = FeaturesConfig {
            budget_floor: 1000.0,
            budget_ceiling: 1000.0,
            ..FeaturesConfig::default()
        };
        assert!(FeatureExtractor::new(&config).is_err());
    }

    #[test]
    fn test_blank_identity_fails_check() {
        let result = extractor().check(&ProfileSnapshot::new("  "));
        assert!(matches!(result, Err(MatchError::FeatureExtraction { .. })));
    }
}
