pub mod benchmarking;
pub mod briefing;
pub mod config;
pub mod error;
pub mod export;
pub mod features;
pub mod http_client;
pub mod observation;
pub mod partition;
pub mod pipeline;
pub mod price_model;
pub mod raw_data;
pub mod simulator;
pub mod snapshot;
pub mod standings;
pub mod stats;
