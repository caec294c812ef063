// Criterion benchmarks for Roommate Match

use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use roommate_match::core::{date_overlap, DateWindow, FeatureExtractor, Matcher, ScoreCache};
use roommate_match::models::{ProfileSnapshot, ScoringWeights};
use tokio_util::sync::CancellationToken;

const LIFESTYLES: [&str; 4] = ["quiet", "balanced", "social", "party"];
const CLEANLINESS: [&str; 4] = ["relaxed", "moderate", "clean", "very_clean"];

fn create_candidate(id: usize) -> ProfileSnapshot {
    let start = NaiveDate::from_ymd_opt(2026, 1 + (id % 12) as u32, 1);
    ProfileSnapshot {
        budget_min: Some(300.0 + (id % 9) as f64 * 75.0),
        budget_max: Some(900.0 + (id % 7) as f64 * 120.0),
        lifestyle: Some(LIFESTYLES[id % 4].to_string()),
        cleanliness: Some(CLEANLINESS[(id / 4) % 4].to_string()),
        room_type: Some(if id % 2 == 0 { "private" } else { "shared" }.to_string()),
        preferred_location: (id % 5 != 0).then(|| format!("district_{}", id % 6)),
        smoking_allowed: (id % 3 != 0).then_some(id % 2 == 0),
        pet_friendly: Some(id % 4 != 1),
        guests_allowed: (id % 7 != 0).then_some(true),
        available_from: start,
        available_until: start.and_then(|d| d.checked_add_days(chrono::Days::new(180))),
        min_stay_months: Some(3 + (id % 6) as u32),
        max_stay_months: Some(12 + (id % 12) as u32),
        ..ProfileSnapshot::new(format!("c{:05}", id))
    }
}

fn create_user() -> ProfileSnapshot {
    ProfileSnapshot {
        budget_min: Some(500.0),
        budget_max: Some(800.0),
        lifestyle: Some("quiet".to_string()),
        cleanliness: Some("clean".to_string()),
        smoking_allowed: Some(false),
        pet_friendly: Some(true),
        available_from: NaiveDate::from_ymd_opt(2026, 3, 1),
        available_until: NaiveDate::from_ymd_opt(2026, 12, 31),
        ..ProfileSnapshot::new("current_user")
    }
}

fn uncached_matcher() -> Matcher {
    Matcher::new(
        ScoringWeights::default(),
        FeatureExtractor::default(),
        ScoreCache::disabled(),
    )
}

fn bench_date_overlap(c: &mut Criterion) {
    let a = DateWindow::new(
        NaiveDate::from_ymd_opt(2026, 1, 1),
        NaiveDate::from_ymd_opt(2026, 6, 30),
    );
    let b = DateWindow::new(NaiveDate::from_ymd_opt(2026, 4, 1), None);

    c.bench_function("date_overlap", |bench| {
        bench.iter(|| date_overlap(black_box(&a), black_box(&b)));
    });
}

fn bench_score_pair(c: &mut Criterion) {
    let matcher = uncached_matcher();
    let user = create_user();
    let candidate = create_candidate(42);

    c.bench_function("score_pair_uncached", |b| {
        b.iter(|| matcher.score_pair(black_box(&user), black_box(&candidate)));
    });
}

fn bench_ranking(c: &mut Criterion) {
    let user = create_user();
    let cancel = CancellationToken::new();

    let mut group = c.benchmark_group("ranking");

    for candidate_count in [10, 100, 1000, 10_000].iter() {
        let candidates: Vec<ProfileSnapshot> = (0..*candidate_count).map(create_candidate).collect();

        let cold = uncached_matcher();
        group.bench_with_input(
            BenchmarkId::new("rank_uncached", candidate_count),
            candidate_count,
            |b, _| {
                b.iter(|| cold.rank(black_box(&user), black_box(&candidates), 20, &cancel));
            },
        );

        let warm = Matcher::with_default_weights();
        group.bench_with_input(
            BenchmarkId::new("rank_cached", candidate_count),
            candidate_count,
            |b, _| {
                b.iter(|| warm.rank(black_box(&user), black_box(&candidates), 20, &cancel));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_date_overlap, bench_score_pair, bench_ranking);

criterion_main!(benches);
