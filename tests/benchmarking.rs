mod common;

use approx::assert_relative_eq;

use common::{find, joined, ladder_season, score};
use franchise_index::benchmarking::{Component, IndexConfig, IndexWeights, TierPolicy, score_index, top_drivers};
use franchise_index::error::ConfigError;
use franchise_index::features::{FeatureConfig, build_features};
use franchise_index::observation::{CpiTier, MarketTier};

#[test]
fn thirty_club_season_splits_five_twenty_five() {
    let rows = score(ladder_season(2023, 30));

    let mut ranks: Vec<u32> = rows.iter().map(|r| r.cpi_rank).collect();
    ranks.sort_unstable();
    assert_eq!(ranks, (1..=30).collect::<Vec<u32>>());

    let count = |tier: CpiTier| rows.iter().filter(|r| r.cpi_tier == tier).count();
    assert_eq!(count(CpiTier::Top), 5);
    assert_eq!(count(CpiTier::Middle), 20);
    assert_eq!(count(CpiTier::Bottom), 5);

    for r in &rows {
        assert!((0.0..=100.0).contains(&r.cpi));
        let expected = if r.cpi_rank <= 5 {
            CpiTier::Top
        } else if r.cpi_rank > 25 {
            CpiTier::Bottom
        } else {
            CpiTier::Middle
        };
        assert_eq!(r.cpi_tier, expected);
    }
}

#[test]
fn better_clubs_score_higher() {
    let rows = score(ladder_season(2023, 30));
    for pair in rows.windows(2) {
        assert!(pair[1].cpi > pair[0].cpi, "{} vs {}", pair[0].entity_id, pair[1].entity_id);
    }
    let best = find(&rows, "E29", 2023);
    assert_eq!(best.cpi_rank, 1);
    assert_relative_eq!(best.fan_demand_score, 100.0);
    assert_relative_eq!(best.revenue_potential_score, 100.0);
    assert_eq!(find(&rows, "E00", 2023).cpi_rank, 30);
}

#[test]
fn cpi_is_rounded_weighted_sum() {
    let rows = score(ladder_season(2023, 12));
    for r in &rows {
        let raw = 0.35 * r.fan_demand_score
            + 0.30 * r.revenue_potential_score
            + 0.20 * r.engagement_momentum_score
            + 0.15 * r.operational_efficiency_score;
        assert!((r.cpi - raw).abs() <= 0.005 + 1e-9);
        assert_relative_eq!(r.cpi * 100.0, (r.cpi * 100.0).round(), epsilon = 1e-6);
    }
}

#[test]
fn seasons_are_scored_independently() {
    let mut input = ladder_season(2022, 30);
    input.extend([
        joined("E00", 2023, MarketTier::Medium, 2_000_000, 40_000, 90, 1),
        joined("E01", 2023, MarketTier::Medium, 1_000_000, 40_000, 60, 0),
    ]);
    let rows = score(input);
    assert_eq!(find(&rows, "E00", 2023).cpi_rank, 1);
    assert_eq!(find(&rows, "E01", 2023).cpi_rank, 2);
    // a two-club season still uses the fixed cut-offs
    assert_eq!(find(&rows, "E01", 2023).cpi_tier, CpiTier::Top);
}

#[test]
fn equal_scores_rank_by_first_seen() {
    let rows = score(vec![
        joined("B", 2023, MarketTier::Small, 1_500_000, 40_000, 80, 0),
        joined("A", 2023, MarketTier::Small, 1_500_000, 40_000, 80, 0),
    ]);
    assert_relative_eq!(rows[0].cpi, rows[1].cpi);
    assert_eq!(rows[0].cpi_rank, 1);
    assert_eq!(rows[1].cpi_rank, 2);
}

#[test]
fn custom_weights_change_the_composite() {
    let weights = IndexWeights::new(1.0, 0.0, 0.0, 0.0).expect("weights should be valid");
    let cfg = IndexConfig {
        weights,
        tiers: TierPolicy::default(),
    };
    let rows = score_index(
        build_features(ladder_season(2023, 8), &FeatureConfig::default()),
        &cfg,
    );
    for r in &rows {
        assert_relative_eq!(r.cpi, (r.fan_demand_score * 100.0).round() / 100.0);
    }
}

#[test]
fn invalid_weights_are_rejected() {
    assert!(matches!(
        IndexWeights::new(0.5, 0.5, 0.1, 0.0),
        Err(ConfigError::WeightSum { .. })
    ));
    assert_eq!(
        IndexWeights::new(1.2, -0.2, 0.0, 0.0),
        Err(ConfigError::InvalidWeight {
            name: "revenue_potential",
            value: -0.2
        })
    );
    assert!(IndexWeights::new(f64::NAN, 0.5, 0.25, 0.25).is_err());
    assert!(IndexWeights::new(0.35, 0.30, 0.20, 0.15).is_ok());
}

#[test]
fn drivers_are_top_three_descending() {
    let rows = score(ladder_season(2023, 10));
    let mut obs = rows[0].clone();
    obs.fan_demand_score = 20.0;
    obs.revenue_potential_score = 90.0;
    obs.engagement_momentum_score = 55.0;
    obs.operational_efficiency_score = 70.0;

    let drivers = top_drivers(&obs);
    let order: Vec<Component> = drivers.iter().map(|d| d.component).collect();
    assert_eq!(
        order,
        [
            Component::RevenuePotential,
            Component::OperationalEfficiency,
            Component::EngagementMomentum
        ]
    );
    assert_relative_eq!(drivers[0].score, 90.0);
}

#[test]
fn driver_ties_keep_component_order() {
    let rows = score(ladder_season(2023, 10));
    let mut obs = rows[0].clone();
    obs.fan_demand_score = 50.0;
    obs.revenue_potential_score = 50.0;
    obs.engagement_momentum_score = 50.0;
    obs.operational_efficiency_score = 50.0;

    let labels: Vec<&str> = top_drivers(&obs).iter().map(|d| d.component.label()).collect();
    assert_eq!(labels, ["Fan Demand", "Revenue Potential", "Engagement Momentum"]);
}
