use crate::observation::{FeatureRow, JoinedRow, MarketTier};
use crate::partition::{entity_histories, partition_by_season};
use crate::stats::{pct_change, round_to, trailing_mean, trailing_std};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarketParams {
    pub base_price: f64,
    pub multiplier: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarketTable {
    pub large: MarketParams,
    pub medium: MarketParams,
    pub small: MarketParams,
    /// Used for any tier label outside Large/Medium/Small.
    pub fallback: MarketParams,
}

impl Default for MarketTable {
    fn default() -> Self {
        Self {
            large: MarketParams {
                base_price: 45.0,
                multiplier: 1.15,
            },
            medium: MarketParams {
                base_price: 35.0,
                multiplier: 1.0,
            },
            small: MarketParams {
                base_price: 28.0,
                multiplier: 0.9,
            },
            fallback: MarketParams {
                base_price: 30.0,
                multiplier: 1.0,
            },
        }
    }
}

impl MarketTable {
    pub fn lookup(&self, tier: &MarketTier) -> MarketParams {
        match tier {
            MarketTier::Large => self.large,
            MarketTier::Medium => self.medium,
            MarketTier::Small => self.small,
            MarketTier::Other(_) => self.fallback,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureConfig {
    pub market: MarketTable,
    pub home_games: f64,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            market: MarketTable::default(),
            home_games: 81.0,
        }
    }
}

const PLAYOFF_WINDOW: usize = 3;
const WINS_WINDOW: usize = 3;
const CONSISTENCY_WINDOW: usize = 4;
const CONSISTENCY_MIN_PERIODS: usize = 2;
const WINS_TREND_SCALE: f64 = 20.0;

#[derive(Debug, Clone, Copy, Default)]
struct Trailing {
    playoff_rate: f64,
    attendance_yoy_growth: f64,
    attendance_consistency: f64,
    wins_trend: f64,
}

/// Derive every feature for the joined table. Output order matches input
/// order; results do not depend on it.
pub fn build_features(rows: Vec<JoinedRow>, cfg: &FeatureConfig) -> Vec<FeatureRow> {
    let wins_percentile = season_wins_percentile(&rows);
    let attendance_pct: Vec<f64> = rows
        .iter()
        .map(|r| attendance_pct(r, cfg.home_games))
        .collect();
    let trailing = trailing_features(&rows, &attendance_pct);

    let out: Vec<FeatureRow> = rows
        .into_iter()
        .enumerate()
        .map(|(idx, raw)| {
            let market = cfg.market.lookup(&raw.market_tier);
            let wins_pct = wins_percentile[idx];
            let t = trailing[idx];
            let pct = attendance_pct[idx];

            let ticket_price_proxy = round_to(market.base_price * (0.9 + 0.3 * wins_pct), 2);
            let sponsorship_proxy = round_to(
                100.0 * market.multiplier * (1.0 + 0.2 * t.playoff_rate + 0.15 * wins_pct),
                1,
            );
            let engagement_momentum = (t.wins_trend + 0.5 * t.playoff_rate).clamp(-1.0, 1.0);
            let fan_demand =
                0.5 * pct + 0.25 * t.attendance_yoy_growth + 0.25 * t.attendance_consistency;
            let revenue_potential =
                ticket_price_proxy * raw.home_attendance as f64 * market.multiplier;

            FeatureRow {
                market_base_price: market.base_price,
                market_multiplier: market.multiplier,
                wins_percentile: wins_pct,
                ticket_price_proxy,
                playoff_rate: t.playoff_rate,
                sponsorship_proxy,
                attendance_pct: pct,
                attendance_yoy_growth: t.attendance_yoy_growth,
                attendance_consistency: t.attendance_consistency,
                wins_trend: t.wins_trend,
                engagement_momentum,
                fan_demand,
                revenue_potential,
                operational_efficiency: t.attendance_consistency,
                raw,
            }
        })
        .collect();

    log::debug!("built features for {} rows", out.len());
    out
}

fn season_wins_percentile(rows: &[JoinedRow]) -> Vec<f64> {
    let mut out = vec![0.0; rows.len()];
    for season in partition_by_season(rows) {
        for (idx, rank) in season.percentile_rank(|r| f64::from(r.wins)) {
            out[idx] = rank;
        }
    }
    out
}

fn attendance_pct(row: &JoinedRow, home_games: f64) -> f64 {
    let seasonal_capacity = row.stadium_capacity as f64 * home_games;
    if seasonal_capacity <= 0.0 {
        // any attendance against no capacity is a full house
        return if row.home_attendance > 0 { 1.0 } else { 0.0 };
    }
    (row.home_attendance as f64 / seasonal_capacity).clamp(0.0, 1.0)
}

fn trailing_features(rows: &[JoinedRow], attendance_pct: &[f64]) -> Vec<Trailing> {
    let mut out = vec![Trailing::default(); rows.len()];
    for history in entity_histories(rows) {
        let playoff = history.series(rows, |r| f64::from(r.playoff_flag));
        let attendance = history.series(rows, |r| r.home_attendance as f64);
        let wins = history.series(rows, |r| f64::from(r.wins));
        let pct: Vec<f64> = history.indices.iter().map(|&i| attendance_pct[i]).collect();

        let playoff_rate = trailing_mean(&playoff, PLAYOFF_WINDOW);
        let growth = pct_change(&attendance);
        let spread = trailing_std(&pct, CONSISTENCY_WINDOW, CONSISTENCY_MIN_PERIODS);
        let wins_mean = trailing_mean(&wins, WINS_WINDOW);

        for (pos, &idx) in history.indices.iter().enumerate() {
            out[idx] = Trailing {
                playoff_rate: playoff_rate[pos],
                attendance_yoy_growth: growth[pos],
                attendance_consistency: (1.0 - spread[pos].unwrap_or(0.0)).clamp(0.0, 1.0),
                wins_trend: (wins[pos] - wins_mean[pos]) / WINS_TREND_SCALE,
            };
        }
    }
    out
}
