//! Shared types, error model, and configuration for the QA merger.
//!
//! This crate is the foundation depended on by the other workspace crates.
//! It provides:
//! - [`QaMergeError`], the unified error type
//! - Domain types ([`QaRecord`], [`Priority`])
//! - Configuration ([`AppConfig`], [`MergeConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CONFIG_FILE_NAME, MatchingConfig, MergeConfig, PathsConfig, TabularConfig,
    config_file_path, init_config, load_config, load_config_from, parse_delimiter,
};
pub use error::{QaMergeError, Result};
pub use types::{MANUAL_SOURCE, Priority, QaRecord, TABULAR_COLUMNS, UnknownPriority};
