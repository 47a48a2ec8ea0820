//! Sparkify warehouse ETL.
//!
//! Resets the star schema and loads it from the raw song and event JSON,
//! either on a Redshift cluster or on a local SQLite file.

pub mod cli;
pub mod cli_style;
pub mod config;
pub mod executor;
pub mod orchestrator;
pub mod pipeline;
pub mod provisioning;
pub mod schema;
pub mod statements;
pub mod warehouse;

pub use orchestrator::{Job, OrchestrationError, Orchestrator, RunReport};
