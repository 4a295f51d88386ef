use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LookupError;
use crate::observation::Observation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MarketCondition {
    Strong,
    #[default]
    Neutral,
    Soft,
}

impl MarketCondition {
    /// Case-insensitive parse; anything unrecognised is treated as Neutral.
    pub fn parse_lenient(raw: &str) -> Self {
        raw.parse().unwrap_or_default()
    }
}

impl FromStr for MarketCondition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strong" => Ok(MarketCondition::Strong),
            "neutral" => Ok(MarketCondition::Neutral),
            "soft" => Ok(MarketCondition::Soft),
            other => Err(format!("unknown market condition '{other}'")),
        }
    }
}

impl fmt::Display for MarketCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MarketCondition::Strong => "Strong",
            MarketCondition::Neutral => "Neutral",
            MarketCondition::Soft => "Soft",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Elasticities {
    pub price: f64,
    pub marketing: f64,
    pub win: f64,
}

impl Default for Elasticities {
    fn default() -> Self {
        Self {
            price: -0.35,
            marketing: 0.18,
            win: 0.25,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulatorConfig {
    pub elasticities: Elasticities,
    pub strong_multiplier: f64,
    pub neutral_multiplier: f64,
    pub soft_multiplier: f64,
    pub attendance_floor: f64,
    pub attendance_ceiling: f64,
    /// Confidence band half-width is `band_base + band_price_slope * |price change|`.
    pub band_base: f64,
    pub band_price_slope: f64,
    pub price_grid: Vec<f64>,
    pub marketing_grid: Vec<f64>,
    pub win_grid: Vec<f64>,
    /// Revenue is divided by `1 + risk_penalty * |price change|` when ranking
    /// grid points.
    pub risk_penalty: f64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            elasticities: Elasticities::default(),
            strong_multiplier: 1.10,
            neutral_multiplier: 1.00,
            soft_multiplier: 0.90,
            attendance_floor: -0.25,
            attendance_ceiling: 0.30,
            band_base: 0.08,
            band_price_slope: 0.10,
            price_grid: vec![0.0, 0.03, 0.05, 0.07],
            marketing_grid: vec![0.0, 0.05, 0.10],
            win_grid: vec![0.0, 0.02, 0.04],
            risk_penalty: 0.5,
        }
    }
}

impl SimulatorConfig {
    pub fn condition_multiplier(&self, condition: MarketCondition) -> f64 {
        match condition {
            MarketCondition::Strong => self.strong_multiplier,
            MarketCondition::Neutral => self.neutral_multiplier,
            MarketCondition::Soft => self.soft_multiplier,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Baseline {
    pub home_attendance: f64,
    pub ticket_price_proxy: f64,
}

impl Baseline {
    pub fn new(home_attendance: f64, ticket_price_proxy: f64) -> Self {
        Self {
            home_attendance,
            ticket_price_proxy,
        }
    }
}

impl TryFrom<&Observation> for Baseline {
    type Error = LookupError;

    fn try_from(obs: &Observation) -> Result<Self, Self::Error> {
        let attendance = obs.home_attendance as f64;
        if attendance <= 0.0 {
            return Err(LookupError::InvalidBaseline {
                entity_id: obs.entity_id.clone(),
                field: "home_attendance",
                value: attendance,
            });
        }
        if !obs.ticket_price_proxy.is_finite() || obs.ticket_price_proxy <= 0.0 {
            return Err(LookupError::InvalidBaseline {
                entity_id: obs.entity_id.clone(),
                field: "ticket_price_proxy",
                value: obs.ticket_price_proxy,
            });
        }
        Ok(Self::new(attendance, obs.ticket_price_proxy))
    }
}

/// Relative changes to apply, as fractions (0.05 = +5%).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Scenario {
    pub price_change_pct: f64,
    pub marketing_lift_pct: f64,
    pub win_change_pct: f64,
    pub market_condition: MarketCondition,
}

impl Scenario {
    pub fn new(price: f64, marketing: f64, wins: f64, condition: MarketCondition) -> Self {
        Self {
            price_change_pct: price,
            marketing_lift_pct: marketing,
            win_change_pct: wins,
            market_condition: condition,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SimulationResult {
    pub projected_attendance: f64,
    pub projected_price: f64,
    pub projected_revenue: f64,
    pub attendance_change_pct: f64,
    pub revenue_change_pct: f64,
    pub confidence_low: f64,
    pub confidence_high: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Recommendation {
    pub scenario: Scenario,
    pub result: SimulationResult,
    pub risk_adjusted_revenue: f64,
}

pub fn simulate(base: Baseline, scenario: Scenario, cfg: &SimulatorConfig) -> SimulationResult {
    let e = cfg.elasticities;
    let market_mult = cfg.condition_multiplier(scenario.market_condition);

    let raw_change = market_mult
        * (e.price * scenario.price_change_pct
            + e.marketing * scenario.marketing_lift_pct
            + e.win * scenario.win_change_pct);
    let attendance_change_pct = raw_change.clamp(cfg.attendance_floor, cfg.attendance_ceiling);

    let projected_attendance = base.home_attendance * (1.0 + attendance_change_pct);
    // price is never clamped
    let projected_price = base.ticket_price_proxy * (1.0 + scenario.price_change_pct);
    let projected_revenue = projected_attendance * projected_price;

    let base_revenue = base.home_attendance * base.ticket_price_proxy;
    let revenue_change_pct = if base_revenue != 0.0 {
        (projected_revenue - base_revenue) / base_revenue
    } else {
        0.0
    };

    let band = cfg.band_base + cfg.band_price_slope * scenario.price_change_pct.abs();
    SimulationResult {
        projected_attendance,
        projected_price,
        projected_revenue,
        attendance_change_pct,
        revenue_change_pct,
        confidence_low: projected_revenue * (1.0 - band),
        confidence_high: projected_revenue * (1.0 + band),
    }
}

/// Grid-search the configured levers under a Neutral market and return the
/// best risk-adjusted scenario.
///
/// Iteration is price, then marketing, then wins; the first combination to
/// reach the maximum wins ties. `None` only when a grid is empty.
pub fn recommend(base: Baseline, cfg: &SimulatorConfig) -> Option<Recommendation> {
    let mut best: Option<Recommendation> = None;
    for &price in &cfg.price_grid {
        for &marketing in &cfg.marketing_grid {
            for &wins in &cfg.win_grid {
                let scenario = Scenario::new(price, marketing, wins, MarketCondition::Neutral);
                let result = simulate(base, scenario, cfg);
                let score = result.projected_revenue / (1.0 + cfg.risk_penalty * price.abs());
                let better = match &best {
                    Some(current) => score > current.risk_adjusted_revenue,
                    None => true,
                };
                if better {
                    best = Some(Recommendation {
                        scenario,
                        result,
                        risk_adjusted_revenue: score,
                    });
                }
            }
        }
    }
    best
}

pub fn recommend_for(obs: &Observation, cfg: &SimulatorConfig) -> Result<Recommendation, LookupError> {
    let base = Baseline::try_from(obs)?;
    recommend(base, cfg).ok_or(LookupError::EmptyScenarioGrid)
}
