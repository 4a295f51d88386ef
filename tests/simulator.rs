mod common;

use approx::assert_relative_eq;

use franchise_index::error::LookupError;
use franchise_index::simulator::{
    Baseline, Elasticities, MarketCondition, Scenario, SimulatorConfig, recommend, recommend_for, simulate,
};

fn base() -> Baseline {
    Baseline::new(2_000_000.0, 35.0)
}

#[test]
fn no_change_reproduces_the_baseline() {
    let cfg = SimulatorConfig::default();
    let result = simulate(base(), Scenario::default(), &cfg);
    assert_relative_eq!(result.projected_attendance, 2_000_000.0);
    assert_relative_eq!(result.projected_price, 35.0);
    assert_relative_eq!(result.projected_revenue, 70_000_000.0);
    assert_relative_eq!(result.revenue_change_pct, 0.0);
    assert_relative_eq!(result.confidence_low, 70_000_000.0 * 0.92, epsilon = 1e-6);
    assert_relative_eq!(result.confidence_high, 70_000_000.0 * 1.08, epsilon = 1e-6);
}

#[test]
fn higher_prices_lower_attendance() {
    let cfg = SimulatorConfig::default();
    let mut last = f64::INFINITY;
    for price in [0.0, 0.03, 0.05, 0.07, 0.10] {
        let result = simulate(base(), Scenario::new(price, 0.0, 0.0, MarketCondition::Neutral), &cfg);
        assert!(result.projected_attendance < last);
        last = result.projected_attendance;
    }

    let result = simulate(base(), Scenario::new(0.05, 0.0, 0.0, MarketCondition::Neutral), &cfg);
    assert_relative_eq!(result.attendance_change_pct, -0.0175, epsilon = 1e-12);
    assert_relative_eq!(result.projected_price, 36.75, epsilon = 1e-9);
    assert_relative_eq!(result.projected_revenue, 2_000_000.0 * 0.9825 * 36.75, epsilon = 1e-3);
}

#[test]
fn modest_price_rise_lifts_revenue() {
    let cfg = SimulatorConfig::default();
    let flat = simulate(base(), Scenario::new(0.0, 0.0, 0.0, MarketCondition::Neutral), &cfg);
    let raised = simulate(base(), Scenario::new(0.05, 0.0, 0.0, MarketCondition::Neutral), &cfg);
    assert!(raised.projected_revenue > flat.projected_revenue);
    assert!(raised.revenue_change_pct > 0.0);
}

#[test]
fn attendance_swing_is_clamped() {
    let cfg = SimulatorConfig::default();
    let base = Baseline::new(1_000_000.0, 30.0);

    let up = simulate(base, Scenario::new(0.0, 0.0, 2.0, MarketCondition::Strong), &cfg);
    assert_relative_eq!(up.attendance_change_pct, 0.30);
    assert_relative_eq!(up.projected_attendance, 1_300_000.0, epsilon = 1e-6);

    let down = simulate(base, Scenario::new(1.0, 0.0, 0.0, MarketCondition::Neutral), &cfg);
    assert_relative_eq!(down.attendance_change_pct, -0.25);
    assert_relative_eq!(down.projected_attendance, 750_000.0, epsilon = 1e-6);
    // price itself is never clamped
    assert_relative_eq!(down.projected_price, 60.0);
}

#[test]
fn market_condition_scales_the_swing() {
    let cfg = SimulatorConfig::default();
    let scenario = |condition| Scenario::new(0.0, 0.10, 0.0, condition);
    let strong = simulate(base(), scenario(MarketCondition::Strong), &cfg);
    let neutral = simulate(base(), scenario(MarketCondition::Neutral), &cfg);
    let soft = simulate(base(), scenario(MarketCondition::Soft), &cfg);
    assert_relative_eq!(neutral.attendance_change_pct, 0.018, epsilon = 1e-12);
    assert_relative_eq!(strong.attendance_change_pct, 0.018 * 1.10, epsilon = 1e-12);
    assert_relative_eq!(soft.attendance_change_pct, 0.018 * 0.90, epsilon = 1e-12);
}

#[test]
fn band_widens_with_price_moves() {
    let cfg = SimulatorConfig::default();
    let result = simulate(base(), Scenario::new(-0.10, 0.0, 0.0, MarketCondition::Neutral), &cfg);
    assert_relative_eq!(result.confidence_low, result.projected_revenue * 0.91, epsilon = 1e-6);
    assert_relative_eq!(result.confidence_high, result.projected_revenue * 1.09, epsilon = 1e-6);
}

#[test]
fn market_condition_parsing() {
    assert_eq!(MarketCondition::parse_lenient("STRONG"), MarketCondition::Strong);
    assert_eq!(MarketCondition::parse_lenient(" soft "), MarketCondition::Soft);
    assert_eq!(MarketCondition::parse_lenient("booming"), MarketCondition::Neutral);
    assert!("booming".parse::<MarketCondition>().is_err());
    assert_eq!(MarketCondition::Soft.to_string(), "Soft");
}

#[test]
fn default_grid_recommends_the_best_risk_adjusted_point() {
    let cfg = SimulatorConfig::default();
    let rec = recommend(base(), &cfg).expect("grid is not empty");

    assert_relative_eq!(rec.scenario.price_change_pct, 0.07);
    assert_relative_eq!(rec.scenario.marketing_lift_pct, 0.10);
    assert_relative_eq!(rec.scenario.win_change_pct, 0.04);
    assert_eq!(rec.scenario.market_condition, MarketCondition::Neutral);

    for &price in &cfg.price_grid {
        for &marketing in &cfg.marketing_grid {
            for &wins in &cfg.win_grid {
                let r = simulate(base(), Scenario::new(price, marketing, wins, MarketCondition::Neutral), &cfg);
                let score = r.projected_revenue / (1.0 + 0.5 * price.abs());
                assert!(score <= rec.risk_adjusted_revenue);
            }
        }
    }
}

#[test]
fn recommendation_stays_inside_the_grid() {
    let cfg = SimulatorConfig::default();
    for (attendance, price) in [(500_000.0, 18.0), (2_900_000.0, 62.0), (1_234_567.0, 41.5)] {
        let rec = recommend(Baseline::new(attendance, price), &cfg).expect("grid is not empty");
        assert!(cfg.price_grid.contains(&rec.scenario.price_change_pct));
        assert!(cfg.marketing_grid.contains(&rec.scenario.marketing_lift_pct));
        assert!(cfg.win_grid.contains(&rec.scenario.win_change_pct));
    }
}

#[test]
fn ties_go_to_the_first_combination() {
    let cfg = SimulatorConfig {
        elasticities: Elasticities {
            price: 0.0,
            marketing: 0.0,
            win: 0.0,
        },
        price_grid: vec![0.0],
        marketing_grid: vec![0.05, 0.0, 0.10],
        win_grid: vec![0.04, 0.0],
        ..SimulatorConfig::default()
    };
    let rec = recommend(base(), &cfg).expect("grid is not empty");
    assert_relative_eq!(rec.scenario.marketing_lift_pct, 0.05);
    assert_relative_eq!(rec.scenario.win_change_pct, 0.04);
}

#[test]
fn empty_grid_has_no_recommendation() {
    let cfg = SimulatorConfig {
        win_grid: Vec::new(),
        ..SimulatorConfig::default()
    };
    assert!(recommend(base(), &cfg).is_none());

    let rows = common::score(common::ladder_season(2023, 4));
    assert_eq!(recommend_for(&rows[0], &cfg), Err(LookupError::EmptyScenarioGrid));
}

#[test]
fn unusable_baseline_is_rejected() {
    let rows = common::score(common::ladder_season(2023, 4));
    let mut obs = rows[1].clone();
    obs.home_attendance = 0;
    let err = Baseline::try_from(&obs).expect_err("zero attendance is not a baseline");
    assert!(matches!(err, LookupError::InvalidBaseline { field: "home_attendance", .. }));

    let rec = recommend_for(&rows[1], &SimulatorConfig::default()).expect("baseline is usable");
    assert_relative_eq!(rec.result.projected_price, rows[1].ticket_price_proxy * 1.07, epsilon = 1e-9);
}
