use anyhow::Result;

use franchise_index::benchmarking::IndexConfig;
use franchise_index::briefing::{BriefingThresholds, league_opportunities};
use franchise_index::config::PipelineConfig;
use franchise_index::pipeline;
use franchise_index::snapshot::PriceModelStatus;

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    env_logger::init();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let cfg = PipelineConfig::from_env().with_args(&args);
    let report = pipeline::run(&cfg, &IndexConfig::default())?;
    let manifest = &report.manifest;

    println!("Pipeline complete");
    println!("Raw: {}", cfg.raw_dir.display());
    println!("Out: {}", cfg.processed_dir.display());
    println!("Rows: {}", manifest.rows);
    println!("Seasons: {:?}", manifest.seasons);
    println!("Standings: {}", manifest.standings_source);
    match &manifest.price_model {
        PriceModelStatus::Fitted { r2, samples } => {
            println!("Price model: r2={r2:.3} on {samples} rows");
        }
        PriceModelStatus::Skipped { reason } => println!("Price model: skipped ({reason})"),
    }

    if let Ok(screens) = league_opportunities(&report.observations, &BriefingThresholds::default()) {
        println!("Leaders {}:", screens.season);
        for (name, cpi) in &screens.leaders {
            println!("  {name:<28} {cpi:>6.2}");
        }
        if !screens.under_monetized.is_empty() {
            println!("Under-monetized: {}", screens.under_monetized.join(", "));
        }
        if !screens.demand_constrained.is_empty() {
            println!("Demand-constrained: {}", screens.demand_constrained.join(", "));
        }
    }

    Ok(())
}
