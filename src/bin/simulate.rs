use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};

use franchise_index::briefing::{BriefingThresholds, club_briefing, recommend_latest};
use franchise_index::config::{PipelineConfig, arg_value};
use franchise_index::simulator::{Baseline, MarketCondition, Scenario, SimulatorConfig, simulate};
use franchise_index::snapshot::{SNAPSHOT_FILE, find_latest, read_snapshot};

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    env_logger::init();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let snapshot_path = arg_value(&args, "--snapshot")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            PipelineConfig::from_env()
                .with_args(&args)
                .processed_dir
                .join(SNAPSHOT_FILE)
        });
    let rows = read_snapshot(&snapshot_path)?;
    let sim = SimulatorConfig::default();
    let thresholds = BriefingThresholds::default();

    let Some(entity_id) = arg_value(&args, "--entity") else {
        println!("Recommended scenarios ({})", snapshot_path.display());
        for briefing in recommend_latest(&rows, &sim, &thresholds) {
            match briefing {
                Ok(b) => {
                    let s = b.recommendation.scenario;
                    println!(
                        "{:<28} price {:+.0}% marketing {:+.0}% wins {:+.0}% revenue {:+.1}%",
                        b.entity_name,
                        s.price_change_pct * 100.0,
                        s.marketing_lift_pct * 100.0,
                        s.win_change_pct * 100.0,
                        b.recommendation.result.revenue_change_pct * 100.0
                    );
                }
                Err(err) => println!("  skipped: {err}"),
            }
        }
        return Ok(());
    };

    let obs = find_latest(&rows, &entity_id)?;
    let base = Baseline::try_from(obs)?;
    let briefing = club_briefing(obs, &sim, &thresholds)?;

    println!("{} ({}, {})", obs.entity_name, obs.entity_id, obs.season);
    println!("CPI: {:.2} rank {} ({})", obs.cpi, obs.cpi_rank, obs.cpi_tier);
    for driver in &briefing.drivers {
        println!("  {:<24} {:>6.1}", driver.component.label(), driver.score);
    }
    println!("Levers: {:?}", briefing.levers);

    let scenario = Scenario::new(
        pct_arg(&args, "--price")?,
        pct_arg(&args, "--marketing")?,
        pct_arg(&args, "--wins")?,
        arg_value(&args, "--market")
            .map(|raw| MarketCondition::parse_lenient(&raw))
            .unwrap_or_default(),
    );
    let result = simulate(base, scenario, &sim);
    println!("Scenario ({} market):", scenario.market_condition);
    println!("  attendance {:.0} ({:+.1}%)", result.projected_attendance, result.attendance_change_pct * 100.0);
    println!("  price {:.2}", result.projected_price);
    println!(
        "  revenue {:.0} ({:+.1}%) [{:.0} - {:.0}]",
        result.projected_revenue,
        result.revenue_change_pct * 100.0,
        result.confidence_low,
        result.confidence_high
    );

    let rec = briefing.recommendation;
    println!(
        "Recommended: price {:+.0}% marketing {:+.0}% wins {:+.0}% -> revenue {:.0} ({:+.1}%)",
        rec.scenario.price_change_pct * 100.0,
        rec.scenario.marketing_lift_pct * 100.0,
        rec.scenario.win_change_pct * 100.0,
        rec.result.projected_revenue,
        rec.result.revenue_change_pct * 100.0
    );

    Ok(())
}

/// Percent argument (`--price=5` is +5%), zero when absent.
fn pct_arg(args: &[String], flag: &str) -> Result<f64> {
    let Some(raw) = arg_value(args, flag) else {
        return Ok(0.0);
    };
    let value = raw
        .trim_end_matches('%')
        .parse::<f64>()
        .with_context(|| format!("{flag} expects a number, got '{raw}'"))?;
    if !value.is_finite() {
        return Err(anyhow!("{flag} must be finite"));
    }
    Ok(value / 100.0)
}
