use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use franchise_index::benchmarking::{IndexConfig, score_index};
use franchise_index::briefing::{BriefingThresholds, recommend_latest};
use franchise_index::features::{FeatureConfig, build_features};
use franchise_index::observation::{JoinedRow, MarketTier, Observation};
use franchise_index::price_model::fit_from_observations;
use franchise_index::simulator::{Baseline, SimulatorConfig, recommend};

const SEASONS: i32 = 20;
const CLUBS: usize = 30;

/// Twenty seasons of a thirty-club league with some spread in every input.
fn sample_league() -> Vec<JoinedRow> {
    let tiers = [MarketTier::Large, MarketTier::Medium, MarketTier::Small];
    let mut rows = Vec::with_capacity(SEASONS as usize * CLUBS);
    for s in 0..SEASONS {
        for c in 0..CLUBS {
            let wins = 55 + ((c * 13 + s as usize * 7) % 50) as u32;
            rows.push(JoinedRow {
                entity_id: format!("C{c:02}"),
                season: 2000 + s,
                entity_name: format!("Club {c}"),
                market_tier: tiers[c % 3].clone(),
                home_attendance: 1_200_000 + ((c * 37_000 + s as usize * 11_000) % 1_800_000) as u64,
                stadium_capacity: 30_000 + (c as u64 % 7) * 2_500,
                wins,
                playoff_flag: u8::from(wins >= 90),
            });
        }
    }
    rows
}

fn scored_league() -> Vec<Observation> {
    score_index(
        build_features(sample_league(), &FeatureConfig::default()),
        &IndexConfig::default(),
    )
}

fn bench_feature_build(c: &mut Criterion) {
    let rows = sample_league();
    let cfg = FeatureConfig::default();
    c.bench_function("feature_build", |b| {
        b.iter(|| {
            let features = build_features(black_box(rows.clone()), &cfg);
            black_box(features.len());
        })
    });
}

fn bench_index_score(c: &mut Criterion) {
    let features = build_features(sample_league(), &FeatureConfig::default());
    let cfg = IndexConfig::default();
    c.bench_function("index_score", |b| {
        b.iter(|| {
            let scored = score_index(black_box(features.clone()), &cfg);
            black_box(scored.len());
        })
    });
}

fn bench_price_fit(c: &mut Criterion) {
    let rows = scored_league();
    c.bench_function("price_fit", |b| {
        b.iter(|| {
            let model = fit_from_observations(black_box(&rows)).unwrap();
            black_box(model.r2);
        })
    });
}

fn bench_recommend(c: &mut Criterion) {
    let cfg = SimulatorConfig::default();
    let base = Baseline::new(2_000_000.0, 35.0);
    c.bench_function("recommend_single", |b| {
        b.iter(|| {
            let rec = recommend(black_box(base), &cfg).unwrap();
            black_box(rec.risk_adjusted_revenue);
        })
    });

    let rows = scored_league();
    let thresholds = BriefingThresholds::default();
    c.bench_function("recommend_latest_season", |b| {
        b.iter(|| {
            let briefings = recommend_latest(black_box(&rows), &cfg, &thresholds);
            black_box(briefings.len());
        })
    });
}

criterion_group!(
    perf,
    bench_feature_build,
    bench_index_score,
    bench_price_fit,
    bench_recommend,
);
criterion_main!(perf);
