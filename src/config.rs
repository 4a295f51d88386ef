use std::env;
use std::path::PathBuf;

use crate::features::{FeatureConfig, MarketTable};
use crate::standings::{HttpStandings, NoStandings, StandingsSource};

pub const DEFAULT_HOME_GAMES: f64 = 81.0;

/// Paths and toggles for one pipeline run. Model constants are not here;
/// they travel in `FeatureConfig`, `IndexConfig` and `SimulatorConfig`.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub raw_dir: PathBuf,
    pub processed_dir: PathBuf,
    pub home_games: f64,
    pub use_standings: bool,
    /// Must contain `{season}` when set.
    pub standings_url: Option<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            raw_dir: PathBuf::from("data/raw"),
            processed_dir: PathBuf::from("data/processed"),
            home_games: DEFAULT_HOME_GAMES,
            use_standings: false,
            standings_url: None,
        }
    }
}

impl PipelineConfig {
    /// Defaults overridden by `FRANCHISE_RAW_DIR`, `FRANCHISE_PROCESSED_DIR`,
    /// `FRANCHISE_HOME_GAMES`, `USE_STANDINGS` and `STANDINGS_URL`.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Some(dir) = opt_env("FRANCHISE_RAW_DIR") {
            cfg.raw_dir = PathBuf::from(dir);
        }
        if let Some(dir) = opt_env("FRANCHISE_PROCESSED_DIR") {
            cfg.processed_dir = PathBuf::from(dir);
        }
        if let Some(games) = opt_env("FRANCHISE_HOME_GAMES")
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|g| g.is_finite() && *g > 0.0)
        {
            cfg.home_games = games;
        }
        cfg.use_standings = opt_env("USE_STANDINGS").is_some_and(|raw| flag_enabled(&raw));
        cfg.standings_url = opt_env("STANDINGS_URL");
        cfg
    }

    pub fn with_args(mut self, args: &[String]) -> Self {
        if let Some(dir) = arg_value(args, "--raw-dir") {
            self.raw_dir = PathBuf::from(dir);
        }
        if let Some(dir) = arg_value(args, "--out-dir") {
            self.processed_dir = PathBuf::from(dir);
        }
        self
    }

    pub fn feature_config(&self) -> FeatureConfig {
        FeatureConfig {
            market: MarketTable::default(),
            home_games: self.home_games,
        }
    }

    /// The enrichment source this run should use. Enrichment without a URL
    /// falls back to the no-op source.
    pub fn standings_source(&self) -> Box<dyn StandingsSource> {
        if !self.use_standings {
            return Box::new(NoStandings);
        }
        match &self.standings_url {
            Some(url) if url.contains("{season}") => Box::new(HttpStandings::new(url.clone())),
            Some(url) => {
                log::warn!("STANDINGS_URL '{url}' has no {{season}} placeholder; enrichment disabled");
                Box::new(NoStandings)
            }
            None => {
                log::warn!("USE_STANDINGS is set but STANDINGS_URL is not; enrichment disabled");
                Box::new(NoStandings)
            }
        }
    }
}

pub fn arg_value(args: &[String], flag: &str) -> Option<String> {
    let prefix = format!("{flag}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(raw) = arg.strip_prefix(&prefix) {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == flag
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(next.trim().to_string());
        }
    }
    None
}

pub fn flag_enabled(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "on" | "yes"
    )
}

fn opt_env(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|val| {
        if val.trim().is_empty() {
            None
        } else {
            Some(val)
        }
    })
}
