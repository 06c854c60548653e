//! Configuration management for flightclues.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::detect::{default_leading_anomalies, DetectorConfig, LeadingAnomalyTable};
use crate::download::{default_documents, validate_document_name};
use crate::error::{Error, Result};
use crate::verify::parse_base_url;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default configuration directory name.
const CONFIG_DIR_NAME: &str = "flightclues";

/// Prefix of environment variable overrides.
const ENV_PREFIX: &str = "FLIGHTCLUES_";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `FLIGHTCLUES_`, sections split by `__`)
/// 2. TOML config file at `~/.config/flightclues/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Record store configuration.
    pub input: InputConfig,
    /// Detector configuration.
    pub scan: ScanConfig,
    /// Verification configuration.
    pub verify: VerifyConfig,
    /// Route map configuration.
    pub visual: VisualConfig,
    /// Record acquisition configuration.
    pub fetch: FetchConfig,
    /// Document download configuration.
    pub download: DownloadConfig,
}

/// Record store configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Path of the JSON record store.
    pub records_path: PathBuf,
}

/// Detector configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Skip country text containing a benign marker.
    pub benign_markers_enabled: bool,
    /// Substrings that mark country text as noise.
    pub benign_markers: Vec<String>,
    /// Literal country names and the leading character each one hides.
    pub leading_anomalies: BTreeMap<String, char>,
}

/// Verification configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifyConfig {
    /// Verify against the endpoint when a token is formed.
    pub enabled: bool,
    /// Base API URL; the token is appended as the last path segment.
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

/// Route map configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualConfig {
    /// Render the route map when verification does not succeed.
    pub on_failure: bool,
    /// Where the SVG map is written.
    pub output_path: PathBuf,
    /// Optional JSON file with extra airport locations.
    pub airports_path: Option<PathBuf>,
}

/// Record acquisition configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Records requested per page.
    pub page_size: u32,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

/// Document download configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// File names requested under `<base>/<token>/download/`.
    pub files: Vec<String>,
    /// Directory the documents are saved into.
    pub output_dir: PathBuf,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            records_path: PathBuf::from("flights_db.json"),
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            benign_markers_enabled: true,
            benign_markers: vec![crate::detect::DEFAULT_BENIGN_MARKER.to_string()],
            leading_anomalies: default_leading_anomalies(),
        }
    }
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "http://localhost:7373/api/v1".to_string(),
            timeout_secs: 5,
        }
    }
}

impl Default for VisualConfig {
    fn default() -> Self {
        Self {
            on_failure: false, // Opt-in only
            output_path: PathBuf::from("route_map.svg"),
            airports_path: None,
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            page_size: 50,
            timeout_secs: 10,
        }
    }
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            files: default_documents(),
            output_dir: PathBuf::from("shadow_files"),
            timeout_secs: 10,
        }
    }
}

impl Config {
    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.verify.timeout_secs == 0 {
            return Err(Error::config_validation(
                "verify.timeout_secs must be greater than 0",
            ));
        }

        if self.fetch.timeout_secs == 0 {
            return Err(Error::config_validation(
                "fetch.timeout_secs must be greater than 0",
            ));
        }

        if self.fetch.page_size == 0 {
            return Err(Error::config_validation(
                "fetch.page_size must be greater than 0",
            ));
        }

        if self.download.timeout_secs == 0 {
            return Err(Error::config_validation(
                "download.timeout_secs must be greater than 0",
            ));
        }

        if self.download.files.is_empty() {
            return Err(Error::config_validation(
                "download.files cannot be empty",
            ));
        }

        if let Some(bad) = self
            .download
            .files
            .iter()
            .find(|f| validate_document_name(f).is_err())
        {
            return Err(Error::config_validation(format!(
                "download.files: {bad:?} is not a plain file name"
            )));
        }

        if let Err(e) = parse_base_url(&self.verify.base_url) {
            return Err(Error::config_validation(format!("verify.base_url: {e}")));
        }

        if self.scan.benign_markers.iter().any(String::is_empty) {
            return Err(Error::config_validation(
                "scan.benign_markers cannot contain empty strings",
            ));
        }

        if self.scan.leading_anomalies.keys().any(String::is_empty) {
            return Err(Error::config_validation(
                "scan.leading_anomalies cannot contain empty literals",
            ));
        }

        Ok(())
    }

    /// Detector configuration derived from the `[scan]` section.
    #[must_use]
    pub fn detector_config(&self) -> DetectorConfig {
        DetectorConfig {
            benign_markers_enabled: self.scan.benign_markers_enabled,
            benign_markers: self.scan.benign_markers.clone(),
            leading_anomalies: LeadingAnomalyTable::from_entries(
                self.scan.leading_anomalies.clone(),
            ),
        }
    }

    /// Get the verification timeout as a Duration.
    #[must_use]
    pub fn verify_timeout(&self) -> Duration {
        Duration::from_secs(self.verify.timeout_secs)
    }

    /// Get the fetch timeout as a Duration.
    #[must_use]
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch.timeout_secs)
    }

    /// Get the download timeout as a Duration.
    #[must_use]
    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download.timeout_secs)
    }
}
