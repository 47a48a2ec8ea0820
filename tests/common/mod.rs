//! Common test infrastructure
//!
//! End-to-end tests run the pipelines against a local SQLite warehouse
//! loaded from fixture JSON files. Tests should only import from this
//! module, not from internal submodules.

mod constants;
mod fixtures;
mod warehouse;

pub use constants::*;
#[allow(unused_imports)]
pub use fixtures::{default_events, next_song_event, page_event, write_log_data};
pub use warehouse::TestWarehouse;
