//! Application configuration for the QA merger.
//!
//! Project config lives at `./qamerge.toml` next to the data it points at.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{QaMergeError, Result};

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = "qamerge.toml";

// ---------------------------------------------------------------------------
// Config structs (matching qamerge.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Input and output locations.
    #[serde(default)]
    pub paths: PathsConfig,

    /// Tabular input parsing.
    #[serde(default)]
    pub tabular: TabularConfig,

    /// Question matching.
    #[serde(default)]
    pub matching: MatchingConfig,
}

/// `[paths]` section. Relative paths resolve against the working directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Manually curated CSV.
    #[serde(default = "default_input")]
    pub input: PathBuf,

    /// Existing collection produced by the scraping step.
    #[serde(default = "default_collection")]
    pub collection: PathBuf,

    /// Where the merged collection is written.
    #[serde(default = "default_output")]
    pub output: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input: default_input(),
            collection: default_collection(),
            output: default_output(),
        }
    }
}

fn default_input() -> PathBuf {
    PathBuf::from("data_augmentation/dental_qa_template.csv")
}
fn default_collection() -> PathBuf {
    PathBuf::from("data/dental_knowledge_base.json")
}
fn default_output() -> PathBuf {
    PathBuf::from("data/dental_knowledge_base_augmented.json")
}

/// `[tabular]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TabularConfig {
    /// Field delimiter. Must be a single ASCII character.
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
}

impl Default for TabularConfig {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
        }
    }
}

fn default_delimiter() -> String {
    ",".into()
}

/// `[matching]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// Collapse inner whitespace runs when normalizing questions.
    #[serde(default = "default_true")]
    pub collapse_whitespace: bool,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            collapse_whitespace: true,
        }
    }
}

fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Merge config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime merge configuration, merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct MergeConfig {
    /// Manually curated CSV.
    pub input: PathBuf,
    /// Existing collection (may be absent on disk).
    pub collection: PathBuf,
    /// Output collection path.
    pub output: PathBuf,
    /// CSV field delimiter byte.
    pub delimiter: u8,
    /// Collapse inner whitespace when normalizing questions.
    pub collapse_whitespace: bool,
    /// Compute and report without writing the output.
    pub dry_run: bool,
}

impl TryFrom<&AppConfig> for MergeConfig {
    type Error = QaMergeError;

    fn try_from(config: &AppConfig) -> Result<Self> {
        Ok(Self {
            input: config.paths.input.clone(),
            collection: config.paths.collection.clone(),
            output: config.paths.output.clone(),
            delimiter: parse_delimiter(&config.tabular.delimiter)?,
            collapse_whitespace: config.matching.collapse_whitespace,
            dry_run: false,
        })
    }
}

/// Validate a delimiter string and return its byte.
pub fn parse_delimiter(raw: &str) -> Result<u8> {
    match raw.as_bytes() {
        [b] if b.is_ascii() && *b != b'"' && *b != b'\n' && *b != b'\r' => Ok(*b),
        _ => Err(QaMergeError::config(format!(
            "invalid delimiter {raw:?}: expected a single ASCII character other than quote or newline"
        ))),
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config file inside `dir`.
pub fn config_file_path(dir: &Path) -> PathBuf {
    dir.join(CONFIG_FILE_NAME)
}

/// Load `qamerge.toml` from `dir`. Returns defaults if the file does not exist.
pub fn load_config(dir: &Path) -> Result<AppConfig> {
    let path = config_file_path(dir);

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| QaMergeError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| QaMergeError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Write a default config file into `dir`.
/// Returns the path to the created file.
pub fn init_config(dir: &Path) -> Result<PathBuf> {
    let path = config_file_path(dir);
    if path.exists() {
        return Err(QaMergeError::config(format!(
            "{} already exists",
            path.display()
        )));
    }

    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| QaMergeError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| QaMergeError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
