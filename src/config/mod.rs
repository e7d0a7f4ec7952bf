//! Configuration management
//!
//! Runtime tunables of the ledger core, read from TOML and `LEDGER_*`
//! environment variables.

pub mod settings;

pub use settings::{Config, GLOBAL_CONFIG};
