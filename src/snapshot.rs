use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::LookupError;
use crate::observation::{Observation, latest_season};
use crate::price_model::PriceModel;

pub const SNAPSHOT_FILE: &str = "club_metrics.csv";
pub const COEFFICIENTS_FILE: &str = "price_sensitivity_coeffs.csv";
pub const MANIFEST_FILE: &str = "run_manifest.json";

pub fn write_snapshot(path: &Path, rows: &[Observation]) -> Result<()> {
    write_atomically(path, |tmp| {
        let mut wtr = csv::Writer::from_path(tmp)
            .with_context(|| format!("create snapshot {}", tmp.display()))?;
        for row in rows {
            wtr.serialize(row).context("serialize snapshot row")?;
        }
        wtr.flush().context("flush snapshot")
    })?;
    log::info!("wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

pub fn read_snapshot(path: &Path) -> Result<Vec<Observation>> {
    let mut rdr = csv::Reader::from_path(path)
        .with_context(|| format!("open snapshot {}", path.display()))?;
    let mut out = Vec::new();
    for (idx, row) in rdr.deserialize().enumerate() {
        let row: Observation =
            row.with_context(|| format!("snapshot row {} in {}", idx + 1, path.display()))?;
        out.push(row);
    }
    Ok(out)
}

/// One-row coefficients table: every slope by name, then `intercept`, `r2`
/// and `samples`.
pub fn write_coefficients(path: &Path, model: &PriceModel) -> Result<()> {
    write_atomically(path, |tmp| {
        let mut wtr = csv::Writer::from_path(tmp)
            .with_context(|| format!("create coefficients {}", tmp.display()))?;
        let mut header: Vec<String> = model.coefficients.iter().map(|(n, _)| n.clone()).collect();
        header.extend(["intercept", "r2", "samples"].map(String::from));
        let mut values: Vec<String> = model.coefficients.iter().map(|(_, v)| v.to_string()).collect();
        values.push(model.intercept.to_string());
        values.push(model.r2.to_string());
        values.push(model.samples.to_string());
        wtr.write_record(&header).context("write coefficients header")?;
        wtr.write_record(&values).context("write coefficients row")?;
        wtr.flush().context("flush coefficients")
    })
}

/// Drop a coefficients file left by an earlier run. A missing file is fine.
pub fn remove_coefficients(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => {
            log::info!("removed stale {}", path.display());
            Ok(())
        }
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err).with_context(|| format!("remove {}", path.display())),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    pub generated_at: String,
    pub rows: usize,
    pub seasons: Vec<i32>,
    pub latest_season: Option<i32>,
    pub standings_source: String,
    pub price_model: PriceModelStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PriceModelStatus {
    Fitted { r2: f64, samples: usize },
    Skipped { reason: String },
}

impl RunManifest {
    pub fn new(rows: &[Observation], standings_source: &str, price_model: PriceModelStatus) -> Self {
        let mut seasons: Vec<i32> = rows.iter().map(|r| r.season).collect();
        seasons.sort_unstable();
        seasons.dedup();
        Self {
            generated_at: Utc::now().to_rfc3339(),
            rows: rows.len(),
            latest_season: latest_season(rows),
            seasons,
            standings_source: standings_source.to_string(),
            price_model,
        }
    }
}

pub fn write_manifest(path: &Path, manifest: &RunManifest) -> Result<()> {
    let json = serde_json::to_string_pretty(manifest).context("serialize run manifest")?;
    write_atomically(path, |tmp| fs::write(tmp, &json).context("write run manifest"))
}

fn write_atomically(path: &Path, write: impl FnOnce(&Path) -> Result<()>) -> Result<()> {
    let tmp = tmp_path(path);
    let result = write(&tmp).and_then(|()| swap_into_place(&tmp, path));
    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn swap_into_place(tmp: &Path, path: &Path) -> Result<()> {
    fs::rename(tmp, path).with_context(|| format!("swap {} into place", path.display()))
}

/// Rows of the most recent season, in snapshot order.
pub fn latest_rows(rows: &[Observation]) -> Vec<&Observation> {
    let Some(season) = latest_season(rows) else {
        return Vec::new();
    };
    rows.iter().filter(|r| r.season == season).collect()
}

pub fn find_latest<'a>(rows: &'a [Observation], entity_id: &str) -> Result<&'a Observation, LookupError> {
    if rows.is_empty() {
        return Err(LookupError::EmptySnapshot);
    }
    latest_rows(rows)
        .into_iter()
        .find(|r| r.entity_id == entity_id)
        .ok_or_else(|| LookupError::UnknownEntity {
            entity_id: entity_id.to_string(),
        })
}
