use std::fs;

use anyhow::{Context, Result};

use crate::benchmarking::{IndexConfig, score_index};
use crate::config::PipelineConfig;
use crate::features::build_features;
use crate::observation::Observation;
use crate::price_model::{PriceModel, fit_from_observations};
use crate::raw_data::{join_tables, load_raw_tables};
use crate::snapshot::{
    COEFFICIENTS_FILE, MANIFEST_FILE, PriceModelStatus, RunManifest, SNAPSHOT_FILE,
    remove_coefficients, write_coefficients, write_manifest, write_snapshot,
};
use crate::standings::StandingsSource;

pub struct RunReport {
    pub observations: Vec<Observation>,
    pub price_model: Option<PriceModel>,
    pub manifest: RunManifest,
}

pub fn build_dataset(
    cfg: &PipelineConfig,
    index: &IndexConfig,
    source: &dyn StandingsSource,
) -> Result<Vec<Observation>> {
    let tables = load_raw_tables(&cfg.raw_dir, source)
        .with_context(|| format!("load raw tables from {}", cfg.raw_dir.display()))?;
    let joined = join_tables(&tables).context("join raw tables")?;
    log::debug!("joined {} entity-season rows", joined.len());
    let features = build_features(joined, &cfg.feature_config());
    Ok(score_index(features, index))
}

/// Full run: build, write the snapshot, fit the price model and write the
/// manifest. A model that cannot be fitted is logged and skipped.
pub fn run(cfg: &PipelineConfig, index: &IndexConfig) -> Result<RunReport> {
    let source = cfg.standings_source();
    let observations = build_dataset(cfg, index, source.as_ref())?;

    fs::create_dir_all(&cfg.processed_dir)
        .with_context(|| format!("create {}", cfg.processed_dir.display()))?;
    write_snapshot(&cfg.processed_dir.join(SNAPSHOT_FILE), &observations)?;

    let (price_model, status) = match fit_from_observations(&observations) {
        Ok(model) => {
            write_coefficients(&cfg.processed_dir.join(COEFFICIENTS_FILE), &model)?;
            let status = PriceModelStatus::Fitted {
                r2: model.r2,
                samples: model.samples,
            };
            (Some(model), status)
        }
        Err(err) => {
            log::warn!("price sensitivity model skipped: {err}");
            remove_coefficients(&cfg.processed_dir.join(COEFFICIENTS_FILE))?;
            (
                None,
                PriceModelStatus::Skipped {
                    reason: err.to_string(),
                },
            )
        }
    };

    let manifest = RunManifest::new(&observations, source.name(), status);
    write_manifest(&cfg.processed_dir.join(MANIFEST_FILE), &manifest)?;
    log::info!(
        "pipeline complete: {} rows across {} seasons",
        manifest.rows,
        manifest.seasons.len()
    );

    Ok(RunReport {
        observations,
        price_model,
        manifest,
    })
}
