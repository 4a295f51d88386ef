use std::path::PathBuf;

use thiserror::Error;

/// Fatal problems with the raw input tables. A run that hits one of these
/// produces no snapshot.
#[derive(Error, Debug)]
pub enum InputError {
    #[error("raw table '{table}' not found at {path}")]
    MissingTable { table: &'static str, path: PathBuf },

    #[error("raw table '{table}' is missing required column '{column}'")]
    MissingColumn {
        table: &'static str,
        column: &'static str,
    },

    #[error("raw table '{table}' has a malformed row at line {line}: {message}")]
    MalformedRow {
        table: &'static str,
        line: u64,
        message: String,
    },

    #[error("raw table '{table}' could not be read: {source}")]
    Csv {
        table: &'static str,
        #[source]
        source: csv::Error,
    },

    #[error("duplicate observation for entity '{entity_id}' in season {season}")]
    DuplicateObservation { entity_id: String, season: i32 },

    #[error("entity '{entity_id}' has no row in raw table '{table}'")]
    UnknownEntity {
        table: &'static str,
        entity_id: String,
    },

    #[error("no attendance observations were loaded")]
    Empty,
}

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("index weight '{name}' must be finite and non-negative, got {value}")]
    InvalidWeight { name: &'static str, value: f64 },

    #[error("index weights must sum to 1.0, got {sum}")]
    WeightSum { sum: f64 },
}

#[derive(Error, Debug, PartialEq)]
pub enum ModelError {
    #[error("price model needs at least {required} usable rows, got {available}")]
    InsufficientSamples { required: usize, available: usize },

    #[error("price model design matrix is singular (column '{column}' is collinear)")]
    SingularDesign { column: String },
}

/// The simulator or a briefing consumer asked for something the snapshot
/// cannot supply.
#[derive(Error, Debug, PartialEq)]
pub enum LookupError {
    #[error("entity '{entity_id}' not found in snapshot")]
    UnknownEntity { entity_id: String },

    #[error("snapshot has no observations")]
    EmptySnapshot,

    #[error("baseline for entity '{entity_id}' is unusable: {field} = {value}")]
    InvalidBaseline {
        entity_id: String,
        field: &'static str,
        value: f64,
    },

    #[error("simulator scenario grid is empty")]
    EmptyScenarioGrid,
}
