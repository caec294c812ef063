use crate::core::features::{exact_match, Category, FeatureVector, Interval, NEUTRAL_SCORE};
use crate::core::overlap::date_overlap;
use crate::models::{CompatibilityScore, Dimension, DimensionScore, ScoringWeights};

/// Calculate a compatibility score (0-1) between two feature vectors
///
/// Scoring formula:
/// score = Σ weight(d) * similarity(d)  over every dimension d
///
/// Every per-dimension rule is symmetric, so swapping the arguments yields the
/// same score bit for bit. The breakdown keeps each unweighted similarity next
/// to its weighted contribution.
pub fn calculate_compatibility(
    a: &FeatureVector,
    b: &FeatureVector,
    weights: &ScoringWeights,
) -> CompatibilityScore {
    let breakdown: Vec<DimensionScore> = Dimension::ALL
        .iter()
        .map(|&dimension| {
            let similarity = dimension_similarity(dimension, a, b);
            let weight = weights.get(dimension);
            DimensionScore {
                dimension,
                similarity,
                weight,
                contribution: similarity * weight,
            }
        })
        .collect();

    let total: f64 = breakdown.iter().map(|d| d.contribution).sum();

    CompatibilityScore {
        total: total.clamp(0.0, 1.0),
        breakdown,
    }
}

/// Similarity (0-1) for a single dimension
pub fn dimension_similarity(dimension: Dimension, a: &FeatureVector, b: &FeatureVector) -> f64 {
    match dimension {
        Dimension::Budget => a.budget.compare_with(&b.budget, Interval::overlap_ratio),
        Dimension::Lifestyle => a.lifestyle.compare_with(&b.lifestyle, Category::similarity),
        Dimension::Cleanliness => a.cleanliness.compare_with(&b.cleanliness, Category::similarity),
        Dimension::Smoking => a.smoking.compare_with(&b.smoking, exact_match),
        Dimension::Pets => a.pets.compare_with(&b.pets, exact_match),
        Dimension::Guests => a.guests.compare_with(&b.guests, exact_match),
        Dimension::Location => a.location.compare_with(&b.location, exact_match),
        Dimension::Availability => date_overlap(&a.availability, &b.availability),
        Dimension::StayDuration => a.stay.compare_with(&b.stay, Interval::overlap_ratio),
        Dimension::HousingType => housing_type_score(a, b),
    }
}

/// Mean of the room-type and apartment-type matches, each neutral when unknown
#[inline]
fn housing_type_score(a: &FeatureVector, b: &FeatureVector) -> f64 {
    let room = a.room_type.compare_with(&b.room_type, exact_match);
    let apartment = a.apartment_type.compare_with(&b.apartment_type, exact_match);

    if !a.room_type.is_set()
        && !b.room_type.is_set()
        && !a.apartment_type.is_set()
        && !b.apartment_type.is_set()
    {
        return NEUTRAL_SCORE;
    }

    (room + apartment) / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::features::FeatureExtractor;
    use crate::models::ProfileSnapshot;
    use chrono::NaiveDate;

    fn full_profile(id: &str) -> ProfileSnapshot {
        ProfileSnapshot {
            budget_min: Some(500.0),
            budget_max: Some(800.0),
            lifestyle: Some("quiet".to_string()),
            cleanliness: Some("clean".to_string()),
            room_type: Some("private".to_string()),
            apartment_type: Some("two_bedroom".to_string()),
            preferred_location: Some("downtown".to_string()),
            smoking_allowed: Some(false),
            pet_friendly: Some(true),
            guests_allowed: Some(true),
            available_from: NaiveDate::from_ymd_opt(2026, 1, 1),
            available_until: NaiveDate::from_ymd_opt(2026, 12, 31),
            min_stay_months: Some(6),
            max_stay_months: Some(12),
            ..ProfileSnapshot::new(id)
        }
    }

    fn score(a: &ProfileSnapshot, b: &ProfileSnapshot) -> CompatibilityScore {
        let extractor = FeatureExtractor::default();
        calculate_compatibility(
            &extractor.extract(a),
            &extractor.extract(b),
            &ScoringWeights::default(),
        )
    }

    #[test]
    fn test_self_score_is_maximal() {
        let profile = full_profile("a");
        let result = score(&profile, &profile);

        assert!((result.total - 1.0).abs() < 1e-9);
        assert!(result.breakdown.iter().all(|d| d.similarity == 1.0));
    }

    #[test]
    fn test_breakdown_covers_every_dimension() {
        let result = score(&full_profile("a"), &ProfileSnapshot::new("b"));

        assert_eq!(result.breakdown.len(), Dimension::ALL.len());
        for dimension in Dimension::ALL {
            assert!(result.dimension(dimension).is_some());
        }
    }

    #[test]
    fn test_contributions_sum_to_total() {
        let mut other = full_profile("b");
        other.budget_min = Some(700.0);
        other.budget_max = Some(1100.0);
        other.lifestyle = Some("social".to_string());
        other.pet_friendly = None;

        let result = score(&full_profile("a"), &other);
        assert!((result.contribution_sum() - result.total).abs() < 1e-9);
    }

    #[test]
    fn test_score_is_symmetric() {
        let a = full_profile("a");
        let mut b = full_profile("b");
        b.budget_min = Some(650.0);
        b.budget_max = Some(1200.0);
        b.cleanliness = Some("relaxed".to_string());
        b.guests_allowed = None;
        b.room_type = Some("shared".to_string());

        assert_eq!(score(&a, &b), score(&b, &a));
    }

    #[test]
    fn test_lifestyle_uses_ordinal_distance() {
        let a = full_profile("a");
        let mut b = full_profile("b");
        b.lifestyle = Some("balanced".to_string());

        let result = score(&a, &b);
        let lifestyle = result.similarity(Dimension::Lifestyle).unwrap();
        assert!((lifestyle - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_housing_type_partial_knowledge() {
        let a = full_profile("a");
        let mut b = full_profile("b");
        b.room_type = None;

        // room unknown (0.5), apartment matches (1.0)
        let result = score(&a, &b);
        assert_eq!(result.similarity(Dimension::HousingType), Some(0.75));

        let empty = score(&ProfileSnapshot::new("x"), &ProfileSnapshot::new("y"));
        assert_eq!(empty.similarity(Dimension::HousingType), Some(NEUTRAL_SCORE));
    }

    #[test]
    fn test_total_is_clamped() {
        let profile = full_profile("a");
        let result = score(&profile, &profile);
        assert!(result.total <= 1.0 && result.total >= 0.0);
    }
}
