//! Data handed to memo writers and dashboards: per-club drivers, strategy
//! levers and the recommended scenario, plus league-level screens.

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::Serialize;

use crate::benchmarking::{Driver, top_drivers};
use crate::error::LookupError;
use crate::observation::{CpiTier, Observation, latest_season};
use crate::simulator::{Recommendation, SimulatorConfig, recommend_for};
use crate::snapshot::latest_rows;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TicketingPlay {
    TargetedPriceLift,
    DynamicBundles,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MarketingPlay {
    FanAcquisition,
    AlwaysOnContent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SponsorshipPlay {
    LocalDigitalPackages,
    PremiumExclusives,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StrategyLevers {
    pub ticketing: TicketingPlay,
    pub marketing: MarketingPlay,
    pub sponsorship: SponsorshipPlay,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BriefingThresholds {
    pub price_lift_min_attendance: f64,
    pub price_lift_max_price: f64,
    pub sponsorship_premium_min: f64,
    pub under_monetized_min_attendance: f64,
    pub under_monetized_max_price: f64,
    pub demand_constrained_max_attendance: f64,
    pub demand_constrained_max_price: f64,
    pub list_len: usize,
}

impl Default for BriefingThresholds {
    fn default() -> Self {
        Self {
            price_lift_min_attendance: 0.82,
            price_lift_max_price: 35.0,
            sponsorship_premium_min: 95.0,
            under_monetized_min_attendance: 0.80,
            under_monetized_max_price: 34.0,
            demand_constrained_max_attendance: 0.65,
            demand_constrained_max_price: 32.0,
            list_len: 5,
        }
    }
}

pub fn strategy_levers(obs: &Observation, t: &BriefingThresholds) -> StrategyLevers {
    let ticketing = if obs.attendance_pct >= t.price_lift_min_attendance
        && obs.ticket_price_proxy < t.price_lift_max_price
    {
        TicketingPlay::TargetedPriceLift
    } else {
        TicketingPlay::DynamicBundles
    };
    let marketing = if obs.engagement_momentum < 0.0 {
        MarketingPlay::FanAcquisition
    } else {
        MarketingPlay::AlwaysOnContent
    };
    let sponsorship = if obs.sponsorship_proxy < t.sponsorship_premium_min {
        SponsorshipPlay::LocalDigitalPackages
    } else {
        SponsorshipPlay::PremiumExclusives
    };
    StrategyLevers {
        ticketing,
        marketing,
        sponsorship,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClubBriefing {
    pub entity_id: String,
    pub entity_name: String,
    pub season: i32,
    pub cpi: f64,
    pub cpi_tier: CpiTier,
    pub drivers: [Driver; 3],
    pub levers: StrategyLevers,
    pub recommendation: Recommendation,
}

pub fn club_briefing(
    obs: &Observation,
    sim: &SimulatorConfig,
    thresholds: &BriefingThresholds,
) -> Result<ClubBriefing, LookupError> {
    let recommendation = recommend_for(obs, sim)?;
    Ok(ClubBriefing {
        entity_id: obs.entity_id.clone(),
        entity_name: obs.entity_name.clone(),
        season: obs.season,
        cpi: obs.cpi,
        cpi_tier: obs.cpi_tier,
        drivers: top_drivers(obs),
        levers: strategy_levers(obs, thresholds),
        recommendation,
    })
}

/// Briefings for every club in the latest season, in snapshot order.
pub fn recommend_latest(
    rows: &[Observation],
    sim: &SimulatorConfig,
    thresholds: &BriefingThresholds,
) -> Vec<Result<ClubBriefing, LookupError>> {
    latest_rows(rows)
        .par_iter()
        .map(|obs| club_briefing(obs, sim, thresholds))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeagueOpportunities {
    pub season: i32,
    pub under_monetized: Vec<String>,
    pub demand_constrained: Vec<String>,
    pub leaders: Vec<(String, f64)>,
}

pub fn league_opportunities(
    rows: &[Observation],
    t: &BriefingThresholds,
) -> Result<LeagueOpportunities, LookupError> {
    let season = latest_season(rows).ok_or(LookupError::EmptySnapshot)?;
    let latest = latest_rows(rows);

    let under_monetized = latest
        .iter()
        .filter(|r| {
            r.attendance_pct > t.under_monetized_min_attendance
                && r.ticket_price_proxy < t.under_monetized_max_price
        })
        .take(t.list_len)
        .map(|r| r.entity_name.clone())
        .collect();
    let demand_constrained = latest
        .iter()
        .filter(|r| {
            r.attendance_pct < t.demand_constrained_max_attendance
                && r.ticket_price_proxy < t.demand_constrained_max_price
        })
        .take(t.list_len)
        .map(|r| r.entity_name.clone())
        .collect();

    let mut by_cpi = latest.clone();
    by_cpi.sort_by(|a, b| b.cpi.total_cmp(&a.cpi));
    let leaders = by_cpi
        .into_iter()
        .take(t.list_len)
        .map(|r| (r.entity_name.clone(), r.cpi))
        .collect();

    Ok(LeagueOpportunities {
        season,
        under_monetized,
        demand_constrained,
        leaders,
    })
}

pub fn league_attendance_trend(rows: &[Observation]) -> Vec<(i32, u64)> {
    let mut totals: BTreeMap<i32, u64> = BTreeMap::new();
    for row in rows {
        *totals.entry(row.season).or_default() += row.home_attendance;
    }
    totals.into_iter().collect()
}
