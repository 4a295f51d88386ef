use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::observation::Observation;
use crate::price_model::PriceModel;
use crate::snapshot::latest_rows;

pub const WORKBOOK_FILE: &str = "club_metrics.xlsx";

pub struct ExportReport {
    pub observations: usize,
    pub leaderboard: usize,
    pub coefficients: usize,
}

/// Write the analyst workbook: every observation, the latest season's
/// leaderboard and, when a model was fitted, its coefficients.
pub fn export_workbook(
    path: &Path,
    rows: &[Observation],
    model: Option<&PriceModel>,
) -> Result<ExportReport> {
    let observation_rows = observation_sheet(rows);
    let leaderboard_rows = leaderboard_sheet(rows);
    let model_rows = model.map(price_model_sheet).unwrap_or_default();

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Observations")?;
        write_rows(sheet, &observation_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Leaderboard")?;
        write_rows(sheet, &leaderboard_rows)?;
    }
    if !model_rows.is_empty() {
        let sheet = workbook.add_worksheet();
        sheet.set_name("PriceModel")?;
        write_rows(sheet, &model_rows)?;
    }

    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;

    Ok(ExportReport {
        observations: observation_rows.len().saturating_sub(1),
        leaderboard: leaderboard_rows.len().saturating_sub(1),
        coefficients: model.map(|m| m.coefficients.len()).unwrap_or(0),
    })
}

fn observation_sheet(rows: &[Observation]) -> Vec<Vec<String>> {
    let mut out = vec![
        [
            "Entity ID",
            "Season",
            "Entity",
            "Market",
            "Home Attendance",
            "Capacity",
            "Wins",
            "Playoffs",
            "Ticket Price",
            "Sponsorship",
            "Attendance %",
            "YoY Growth",
            "Consistency",
            "Momentum",
            "Revenue Proxy",
            "CPI",
            "Rank",
            "Tier",
        ]
        .map(String::from)
        .to_vec(),
    ];
    for r in rows {
        out.push(vec![
            r.entity_id.clone(),
            r.season.to_string(),
            r.entity_name.clone(),
            r.market_tier.to_string(),
            r.home_attendance.to_string(),
            r.stadium_capacity.to_string(),
            r.wins.to_string(),
            r.playoff_flag.to_string(),
            format!("{:.2}", r.ticket_price_proxy),
            format!("{:.1}", r.sponsorship_proxy),
            format!("{:.3}", r.attendance_pct),
            format!("{:.3}", r.attendance_yoy_growth),
            format!("{:.3}", r.attendance_consistency),
            format!("{:.3}", r.engagement_momentum),
            format!("{:.0}", r.revenue_proxy),
            format!("{:.2}", r.cpi),
            r.cpi_rank.to_string(),
            r.cpi_tier.to_string(),
        ]);
    }
    out
}

fn leaderboard_sheet(rows: &[Observation]) -> Vec<Vec<String>> {
    let mut latest = latest_rows(rows);
    latest.sort_by_key(|r| r.cpi_rank);
    let mut out = vec![
        [
            "Rank",
            "Entity",
            "Season",
            "CPI",
            "Tier",
            "Fan Demand",
            "Revenue Potential",
            "Engagement Momentum",
            "Operational Efficiency",
        ]
        .map(String::from)
        .to_vec(),
    ];
    for r in latest {
        out.push(vec![
            r.cpi_rank.to_string(),
            r.entity_name.clone(),
            r.season.to_string(),
            format!("{:.2}", r.cpi),
            r.cpi_tier.to_string(),
            format!("{:.1}", r.fan_demand_score),
            format!("{:.1}", r.revenue_potential_score),
            format!("{:.1}", r.engagement_momentum_score),
            format!("{:.1}", r.operational_efficiency_score),
        ]);
    }
    out
}

fn price_model_sheet(model: &PriceModel) -> Vec<Vec<String>> {
    let mut out = vec![vec!["Term".to_string(), "Value".to_string()]];
    for (name, coef) in &model.coefficients {
        out.push(vec![name.clone(), format!("{coef:.6}")]);
    }
    out.push(vec!["intercept".to_string(), format!("{:.6}", model.intercept)]);
    out.push(vec!["r2".to_string(), format!("{:.4}", model.r2)]);
    out.push(vec!["samples".to_string(), model.samples.to_string()]);
    if let Some(tier) = &model.reference_tier {
        out.push(vec!["reference_tier".to_string(), tier.clone()]);
    }
    out
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32, col_idx as u16, value)
                .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}
