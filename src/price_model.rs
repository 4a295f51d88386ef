use std::collections::BTreeSet;

use serde::Serialize;

use crate::error::ModelError;
use crate::observation::{MarketTier, Observation};

pub const MIN_SAMPLES: usize = 5;

const PIVOT_EPS: f64 = 1e-10;
const SCALE_EPS: f64 = 1e-12;

pub const PRICE_COLUMN: &str = "ticket_price_proxy";
pub const WINS_COLUMN: &str = "wins";

#[derive(Debug, Clone, PartialEq)]
pub struct PriceSample {
    pub attendance_pct: f64,
    pub ticket_price_proxy: f64,
    pub wins: f64,
    pub market_tier: MarketTier,
}

impl From<&Observation> for PriceSample {
    fn from(obs: &Observation) -> Self {
        Self {
            attendance_pct: obs.attendance_pct,
            ticket_price_proxy: obs.ticket_price_proxy,
            wins: f64::from(obs.wins),
            market_tier: obs.market_tier.clone(),
        }
    }
}

impl PriceSample {
    fn is_usable(&self) -> bool {
        self.attendance_pct.is_finite() && self.ticket_price_proxy.is_finite() && self.wins.is_finite()
    }
}

/// Fitted `attendance_pct ~ price + wins + tier indicators`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceModel {
    pub intercept: f64,
    pub coefficients: Vec<(String, f64)>,
    pub r2: f64,
    pub samples: usize,
    /// Tier absorbed into the intercept, if any tiers were present.
    pub reference_tier: Option<String>,
}

impl PriceModel {
    pub fn coefficient(&self, name: &str) -> Option<f64> {
        self.coefficients
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }

    pub fn predict(&self, sample: &PriceSample) -> f64 {
        let tier_column = tier_column(sample.market_tier.label());
        self.coefficients
            .iter()
            .fold(self.intercept, |acc, (name, coef)| {
                let x = match name.as_str() {
                    PRICE_COLUMN => sample.ticket_price_proxy,
                    WINS_COLUMN => sample.wins,
                    other if other == tier_column => 1.0,
                    _ => 0.0,
                };
                acc + coef * x
            })
    }
}

fn tier_column(label: &str) -> String {
    format!("tier_{label}")
}

pub fn fit_from_observations(rows: &[Observation]) -> Result<PriceModel, ModelError> {
    let samples: Vec<PriceSample> = rows.iter().map(PriceSample::from).collect();
    fit_price_sensitivity(&samples)
}

/// Ordinary least squares with an intercept over every usable sample.
///
/// Tiers are one-hot encoded in label order with the first label dropped.
pub fn fit_price_sensitivity(samples: &[PriceSample]) -> Result<PriceModel, ModelError> {
    let usable: Vec<&PriceSample> = samples.iter().filter(|s| s.is_usable()).collect();
    if usable.len() < MIN_SAMPLES {
        return Err(ModelError::InsufficientSamples {
            required: MIN_SAMPLES,
            available: usable.len(),
        });
    }

    let tiers: BTreeSet<&str> = usable.iter().map(|s| s.market_tier.label()).collect();
    let reference_tier = tiers.iter().next().map(|t| t.to_string());
    let dummy_tiers: Vec<&str> = tiers.iter().skip(1).copied().collect();

    let mut names = vec![PRICE_COLUMN.to_string(), WINS_COLUMN.to_string()];
    names.extend(dummy_tiers.iter().map(|t| tier_column(t)));
    let p = names.len();
    if usable.len() < p + 1 {
        return Err(ModelError::InsufficientSamples {
            required: p + 1,
            available: usable.len(),
        });
    }

    let x: Vec<Vec<f64>> = usable
        .iter()
        .map(|s| {
            let mut row = vec![s.ticket_price_proxy, s.wins];
            let label = s.market_tier.label();
            row.extend(dummy_tiers.iter().map(|t| if *t == label { 1.0 } else { 0.0 }));
            row
        })
        .collect();
    let y: Vec<f64> = usable.iter().map(|s| s.attendance_pct).collect();
    let n = x.len() as f64;

    let means: Vec<f64> = (0..p).map(|j| x.iter().map(|r| r[j]).sum::<f64>() / n).collect();
    let scales: Vec<f64> = (0..p)
        .map(|j| {
            let var = x.iter().map(|r| (r[j] - means[j]).powi(2)).sum::<f64>() / n;
            var.sqrt()
        })
        .collect();
    if let Some(j) = (0..p).find(|&j| scales[j] <= SCALE_EPS) {
        // constant column, indistinguishable from the intercept
        return Err(ModelError::SingularDesign {
            column: names[j].clone(),
        });
    }

    let y_mean = y.iter().sum::<f64>() / n;
    let z: Vec<Vec<f64>> = x
        .iter()
        .map(|r| (0..p).map(|j| (r[j] - means[j]) / scales[j]).collect())
        .collect();

    let mut gram = vec![vec![0.0; p]; p];
    let mut rhs = vec![0.0; p];
    for (row, target) in z.iter().zip(&y) {
        for a in 0..p {
            rhs[a] += row[a] * (target - y_mean);
            for b in 0..p {
                gram[a][b] += row[a] * row[b];
            }
        }
    }

    let standardized = solve(gram, rhs).map_err(|col| ModelError::SingularDesign {
        column: names[col].clone(),
    })?;
    let beta: Vec<f64> = standardized
        .iter()
        .zip(&scales)
        .map(|(b, s)| b / s)
        .collect();
    let intercept = y_mean - beta.iter().zip(&means).map(|(b, m)| b * m).sum::<f64>();

    let mut ss_res = 0.0;
    let mut ss_tot = 0.0;
    for (row, target) in x.iter().zip(&y) {
        let fitted = intercept + row.iter().zip(&beta).map(|(v, b)| v * b).sum::<f64>();
        ss_res += (target - fitted).powi(2);
        ss_tot += (target - y_mean).powi(2);
    }
    let r2 = if ss_tot > 0.0 {
        1.0 - ss_res / ss_tot
    } else if ss_res <= f64::EPSILON {
        1.0
    } else {
        0.0
    };

    log::info!(
        "price sensitivity fit on {} rows: r2={r2:.4}",
        usable.len()
    );
    Ok(PriceModel {
        intercept,
        coefficients: names.into_iter().zip(beta).collect(),
        r2,
        samples: usable.len(),
        reference_tier,
    })
}

/// Gaussian elimination with partial pivoting. On a vanishing pivot returns
/// the offending column.
fn solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Result<Vec<f64>, usize> {
    let n = b.len();
    let scale = (0..n).map(|i| a[i][i].abs()).fold(0.0, f64::max).max(1.0);
    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))
            .unwrap_or(col);
        if a[pivot][col].abs() <= PIVOT_EPS * scale {
            return Err(col);
        }
        a.swap(col, pivot);
        b.swap(col, pivot);
        for row in col + 1..n {
            let factor = a[row][col] / a[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                let delta = factor * a[col][k];
                a[row][k] -= delta;
            }
            let delta = factor * b[col];
            b[row] -= delta;
        }
    }

    let mut out = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| a[row][k] * out[k]).sum();
        out[row] = (b[row] - tail) / a[row][row];
    }
    Ok(out)
}
