#![allow(dead_code)]

use std::path::PathBuf;

use franchise_index::benchmarking::{IndexConfig, score_index};
use franchise_index::features::{FeatureConfig, build_features};
use franchise_index::observation::{JoinedRow, MarketTier, Observation};

pub fn fixture_dir(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

pub fn joined(
    id: &str,
    season: i32,
    tier: MarketTier,
    home_attendance: u64,
    stadium_capacity: u64,
    wins: u32,
    playoff_flag: u8,
) -> JoinedRow {
    JoinedRow {
        entity_id: id.to_string(),
        season,
        entity_name: format!("{id} Club"),
        market_tier: tier,
        home_attendance,
        stadium_capacity,
        wins,
        playoff_flag,
    }
}

/// One season of `n` clubs where club `i` beats club `i - 1` on attendance
/// and wins.
pub fn ladder_season(season: i32, n: usize) -> Vec<JoinedRow> {
    (0..n)
        .map(|i| {
            joined(
                &format!("E{i:02}"),
                season,
                MarketTier::Medium,
                1_000_000 + 40_000 * i as u64,
                40_000,
                60 + i as u32,
                u8::from(i >= n / 2),
            )
        })
        .collect()
}

pub fn score(rows: Vec<JoinedRow>) -> Vec<Observation> {
    let features = build_features(rows, &FeatureConfig::default());
    score_index(features, &IndexConfig::default())
}

pub fn find<'a>(rows: &'a [Observation], id: &str, season: i32) -> &'a Observation {
    rows.iter()
        .find(|r| r.entity_id == id && r.season == season)
        .expect("observation should exist")
}
