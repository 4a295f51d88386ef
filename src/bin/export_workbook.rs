use std::path::PathBuf;

use anyhow::Result;

use franchise_index::config::{PipelineConfig, arg_value};
use franchise_index::export::{WORKBOOK_FILE, export_workbook};
use franchise_index::price_model::fit_from_observations;
use franchise_index::snapshot::{SNAPSHOT_FILE, read_snapshot};

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    env_logger::init();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let cfg = PipelineConfig::from_env().with_args(&args);
    let snapshot_path = cfg.processed_dir.join(SNAPSHOT_FILE);
    let out_path = arg_value(&args, "--xlsx")
        .map(PathBuf::from)
        .unwrap_or_else(|| cfg.processed_dir.join(WORKBOOK_FILE));

    let rows = read_snapshot(&snapshot_path)?;
    let model = match fit_from_observations(&rows) {
        Ok(model) => Some(model),
        Err(err) => {
            log::warn!("workbook written without price model: {err}");
            None
        }
    };
    let report = export_workbook(&out_path, &rows, model.as_ref())?;

    println!("Workbook: {}", out_path.display());
    println!("Observations: {}", report.observations);
    println!("Leaderboard: {}", report.leaderboard);
    println!("Coefficients: {}", report.coefficients);
    Ok(())
}
