use std::fmt;

use serde::{Deserialize, Serialize};

use crate::partition::SeasonRow;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MarketTier {
    Large,
    Medium,
    Small,
    Other(String),
}

impl MarketTier {
    pub fn label(&self) -> &str {
        match self {
            MarketTier::Large => "Large",
            MarketTier::Medium => "Medium",
            MarketTier::Small => "Small",
            MarketTier::Other(raw) => raw.as_str(),
        }
    }
}

impl From<String> for MarketTier {
    fn from(raw: String) -> Self {
        match raw.trim() {
            "Large" => MarketTier::Large,
            "Medium" => MarketTier::Medium,
            "Small" => MarketTier::Small,
            other => MarketTier::Other(other.to_string()),
        }
    }
}

impl From<MarketTier> for String {
    fn from(tier: MarketTier) -> Self {
        tier.label().to_string()
    }
}

impl fmt::Display for MarketTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CpiTier {
    #[serde(rename = "Top 5")]
    Top,
    #[serde(rename = "Middle 20")]
    Middle,
    #[serde(rename = "Bottom 5")]
    Bottom,
}

impl CpiTier {
    pub fn label(self) -> &'static str {
        match self {
            CpiTier::Top => "Top 5",
            CpiTier::Middle => "Middle 20",
            CpiTier::Bottom => "Bottom 5",
        }
    }
}

impl fmt::Display for CpiTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JoinedRow {
    pub entity_id: String,
    pub season: i32,
    pub entity_name: String,
    pub market_tier: MarketTier,
    pub home_attendance: u64,
    pub stadium_capacity: u64,
    pub wins: u32,
    pub playoff_flag: u8,
}

impl SeasonRow for JoinedRow {
    fn entity_id(&self) -> &str {
        &self.entity_id
    }

    fn season(&self) -> i32 {
        self.season
    }
}

/// A joined row plus everything the feature engine derives from it.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    pub raw: JoinedRow,
    pub market_base_price: f64,
    pub market_multiplier: f64,
    pub wins_percentile: f64,
    pub ticket_price_proxy: f64,
    pub playoff_rate: f64,
    pub sponsorship_proxy: f64,
    pub attendance_pct: f64,
    pub attendance_yoy_growth: f64,
    pub attendance_consistency: f64,
    pub wins_trend: f64,
    pub engagement_momentum: f64,
    pub fan_demand: f64,
    pub revenue_potential: f64,
    pub operational_efficiency: f64,
}

impl SeasonRow for FeatureRow {
    fn entity_id(&self) -> &str {
        &self.raw.entity_id
    }

    fn season(&self) -> i32 {
        self.raw.season
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexScores {
    pub fan_demand_score: f64,
    pub revenue_potential_score: f64,
    pub engagement_momentum_score: f64,
    pub operational_efficiency_score: f64,
    pub cpi: f64,
    pub cpi_rank: u32,
    pub cpi_tier: CpiTier,
}

/// A fully scored entity-season: one row of the processed snapshot.
///
/// Field names are the snapshot's column names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub entity_id: String,
    pub season: i32,
    pub entity_name: String,
    pub market_tier: MarketTier,
    pub home_attendance: u64,
    pub stadium_capacity: u64,
    pub wins: u32,
    pub playoff_flag: u8,
    pub market_base_price: f64,
    pub market_multiplier: f64,
    pub wins_percentile: f64,
    pub ticket_price_proxy: f64,
    pub playoff_rate: f64,
    pub sponsorship_proxy: f64,
    pub attendance_pct: f64,
    pub attendance_yoy_growth: f64,
    pub attendance_consistency: f64,
    pub wins_trend: f64,
    pub engagement_momentum: f64,
    pub fan_demand: f64,
    pub revenue_potential: f64,
    pub revenue_proxy: f64,
    pub operational_efficiency: f64,
    pub fan_demand_score: f64,
    pub revenue_potential_score: f64,
    pub engagement_momentum_score: f64,
    pub operational_efficiency_score: f64,
    pub cpi: f64,
    pub cpi_rank: u32,
    pub cpi_tier: CpiTier,
}

impl Observation {
    pub fn from_scored(features: FeatureRow, scores: IndexScores) -> Self {
        let FeatureRow {
            raw,
            market_base_price,
            market_multiplier,
            wins_percentile,
            ticket_price_proxy,
            playoff_rate,
            sponsorship_proxy,
            attendance_pct,
            attendance_yoy_growth,
            attendance_consistency,
            wins_trend,
            engagement_momentum,
            fan_demand,
            revenue_potential,
            operational_efficiency,
        } = features;
        Self {
            entity_id: raw.entity_id,
            season: raw.season,
            entity_name: raw.entity_name,
            market_tier: raw.market_tier,
            home_attendance: raw.home_attendance,
            stadium_capacity: raw.stadium_capacity,
            wins: raw.wins,
            playoff_flag: raw.playoff_flag,
            market_base_price,
            market_multiplier,
            wins_percentile,
            ticket_price_proxy,
            playoff_rate,
            sponsorship_proxy,
            attendance_pct,
            attendance_yoy_growth,
            attendance_consistency,
            wins_trend,
            engagement_momentum,
            fan_demand,
            revenue_potential,
            revenue_proxy: revenue_potential,
            operational_efficiency,
            fan_demand_score: scores.fan_demand_score,
            revenue_potential_score: scores.revenue_potential_score,
            engagement_momentum_score: scores.engagement_momentum_score,
            operational_efficiency_score: scores.operational_efficiency_score,
            cpi: scores.cpi,
            cpi_rank: scores.cpi_rank,
            cpi_tier: scores.cpi_tier,
        }
    }
}

impl SeasonRow for Observation {
    fn entity_id(&self) -> &str {
        &self.entity_id
    }

    fn season(&self) -> i32 {
        self.season
    }
}

pub fn latest_season<T: SeasonRow>(rows: &[T]) -> Option<i32> {
    rows.iter().map(SeasonRow::season).max()
}
