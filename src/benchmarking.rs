use serde::Serialize;

use crate::error::ConfigError;
use crate::observation::{CpiTier, FeatureRow, IndexScores, Observation};
use crate::partition::partition_by_season;
use crate::stats::round_to;

const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexWeights {
    fan_demand: f64,
    revenue_potential: f64,
    engagement_momentum: f64,
    operational_efficiency: f64,
}

impl IndexWeights {
    /// Weights must be finite, non-negative and sum to 1.0, which keeps the
    /// composite inside 0-100.
    pub fn new(
        fan_demand: f64,
        revenue_potential: f64,
        engagement_momentum: f64,
        operational_efficiency: f64,
    ) -> Result<Self, ConfigError> {
        let named = [
            ("fan_demand", fan_demand),
            ("revenue_potential", revenue_potential),
            ("engagement_momentum", engagement_momentum),
            ("operational_efficiency", operational_efficiency),
        ];
        for (name, value) in named {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidWeight { name, value });
            }
        }
        let sum: f64 = named.iter().map(|(_, v)| v).sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ConfigError::WeightSum { sum });
        }
        Ok(Self {
            fan_demand,
            revenue_potential,
            engagement_momentum,
            operational_efficiency,
        })
    }

    pub fn for_component(&self, component: Component) -> f64 {
        match component {
            Component::FanDemand => self.fan_demand,
            Component::RevenuePotential => self.revenue_potential,
            Component::EngagementMomentum => self.engagement_momentum,
            Component::OperationalEfficiency => self.operational_efficiency,
        }
    }
}

impl Default for IndexWeights {
    fn default() -> Self {
        Self {
            fan_demand: 0.35,
            revenue_potential: 0.30,
            engagement_momentum: 0.20,
            operational_efficiency: 0.15,
        }
    }
}

/// Rank cut-offs for tiering. These are fixed league-size constants: a
/// 30-club season splits 5/20/5, other sizes simply move the middle band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierPolicy {
    pub top: u32,
    pub bottom_after: u32,
    pub expected_entities: usize,
}

impl Default for TierPolicy {
    fn default() -> Self {
        Self {
            top: 5,
            bottom_after: 25,
            expected_entities: 30,
        }
    }
}

impl TierPolicy {
    pub fn tier_for_rank(&self, rank: u32) -> CpiTier {
        if rank <= self.top {
            CpiTier::Top
        } else if rank > self.bottom_after {
            CpiTier::Bottom
        } else {
            CpiTier::Middle
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IndexConfig {
    pub weights: IndexWeights,
    pub tiers: TierPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Component {
    FanDemand,
    RevenuePotential,
    EngagementMomentum,
    OperationalEfficiency,
}

impl Component {
    pub const ALL: [Component; 4] = [
        Component::FanDemand,
        Component::RevenuePotential,
        Component::EngagementMomentum,
        Component::OperationalEfficiency,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Component::FanDemand => "Fan Demand",
            Component::RevenuePotential => "Revenue Potential",
            Component::EngagementMomentum => "Engagement Momentum",
            Component::OperationalEfficiency => "Operational Efficiency",
        }
    }

    fn raw_value(self, row: &FeatureRow) -> f64 {
        match self {
            Component::FanDemand => row.fan_demand,
            Component::RevenuePotential => row.revenue_potential,
            Component::EngagementMomentum => row.engagement_momentum,
            Component::OperationalEfficiency => row.operational_efficiency,
        }
    }

    pub fn score(self, obs: &Observation) -> f64 {
        match self {
            Component::FanDemand => obs.fan_demand_score,
            Component::RevenuePotential => obs.revenue_potential_score,
            Component::EngagementMomentum => obs.engagement_momentum_score,
            Component::OperationalEfficiency => obs.operational_efficiency_score,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Driver {
    pub component: Component,
    pub score: f64,
}

pub fn score_index(rows: Vec<FeatureRow>, cfg: &IndexConfig) -> Vec<Observation> {
    let n = rows.len();
    let mut component_scores = vec![[0.0f64; 4]; n];
    let mut ranks = vec![0u32; n];

    let seasons = partition_by_season(&rows);
    for season in &seasons {
        for (slot, component) in Component::ALL.into_iter().enumerate() {
            for (idx, pct) in season.percentile_rank(|r| component.raw_value(r)) {
                component_scores[idx][slot] = pct * 100.0;
            }
        }
    }

    let cpi: Vec<f64> = component_scores
        .iter()
        .map(|scores| composite(scores, &cfg.weights))
        .collect();

    for season in &seasons {
        if season.len() != cfg.tiers.expected_entities {
            log::warn!(
                "season {} has {} entities; tier cut-offs assume {}",
                season.season(),
                season.len(),
                cfg.tiers.expected_entities
            );
        }
        for (idx, rank) in season.rank_descending(|idx, _| cpi[idx]) {
            ranks[idx] = rank;
        }
    }
    drop(seasons);

    let out: Vec<Observation> = rows
        .into_iter()
        .enumerate()
        .map(|(idx, row)| {
            let [fan, revenue, engagement, efficiency] = component_scores[idx];
            let scores = IndexScores {
                fan_demand_score: fan,
                revenue_potential_score: revenue,
                engagement_momentum_score: engagement,
                operational_efficiency_score: efficiency,
                cpi: cpi[idx],
                cpi_rank: ranks[idx],
                cpi_tier: cfg.tiers.tier_for_rank(ranks[idx]),
            };
            Observation::from_scored(row, scores)
        })
        .collect();
    log::info!("scored {} observations", out.len());
    out
}

fn composite(scores: &[f64; 4], weights: &IndexWeights) -> f64 {
    let total: f64 = Component::ALL
        .into_iter()
        .zip(scores)
        .map(|(component, score)| score * weights.for_component(component))
        .sum();
    round_to(total, 2)
}

/// The three strongest index components for one scored row, highest first.
/// Equal scores keep the fixed component order.
pub fn top_drivers(obs: &Observation) -> [Driver; 3] {
    let mut drivers: Vec<Driver> = Component::ALL
        .into_iter()
        .map(|component| Driver {
            component,
            score: component.score(obs),
        })
        .collect();
    // stable sort keeps component order on ties
    drivers.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    [drivers[0], drivers[1], drivers[2]]
}
