pub mod analyze;
pub mod config;
pub mod correlate;
pub mod domain;
pub mod ingest;
pub mod market;
pub mod pipeline;
pub mod quarantine;
pub mod recorder;
pub mod score;
pub mod storage;
