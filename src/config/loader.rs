//! Configuration file loading with precedence handling.

use crate::provider::google::DEFAULT_LANGUAGE;
use crate::provider::DEFAULT_PLACE_TYPES;
use crate::state::{
    ControllerSettings, DEFAULT_DEBOUNCE, DEFAULT_MIN_QUERY_CHARS, DEFAULT_SELECTION_GUARD,
};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Default country restriction.
pub const DEFAULT_COUNTRY: &str = "it";

/// Default placeholder shown in an empty input.
pub const DEFAULT_PLACEHOLDER: &str = "Search city or town...";

/// Environment variable naming an explicit config file.
pub const ENV_CONFIG: &str = "PLACEPICK_CONFIG";
/// Environment variable holding the provider credential.
pub const ENV_API_KEY: &str = "PLACEPICK_API_KEY";
/// Fallback credential variable shared with other Maps tooling.
pub const ENV_GOOGLE_API_KEY: &str = "GOOGLE_MAPS_API_KEY";
/// Environment variable overriding the country restriction.
pub const ENV_COUNTRY: &str = "PLACEPICK_COUNTRY";
/// Environment variable overriding the response language.
pub const ENV_LANGUAGE: &str = "PLACEPICK_LANGUAGE";

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Failed to read config file (permission issues, directory in the way).
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML or unknown keys.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },
}

/// TOML configuration file structure.
///
/// All fields are optional - if not specified, hardcoded defaults are used.
/// Corresponds to `~/.config/placepick/config.toml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Places provider credential.
    #[serde(default)]
    pub api_key: Option<String>,

    /// ISO country restriction; `""` disables it.
    #[serde(default)]
    pub country: Option<String>,

    /// Place-type filter, e.g. `"(cities)"` or `"geocode"`.
    #[serde(default)]
    pub place_types: Option<String>,

    /// Response language.
    #[serde(default)]
    pub language: Option<String>,

    /// Debounce window in milliseconds.
    #[serde(default)]
    pub debounce_ms: Option<u64>,

    /// Post-selection guard window in milliseconds.
    #[serde(default)]
    pub selection_guard_ms: Option<u64>,

    /// Minimum trimmed query length.
    #[serde(default)]
    pub min_query_chars: Option<usize>,

    /// Offline gazetteer file; when set, no network provider is used.
    #[serde(default)]
    pub gazetteer: Option<PathBuf>,

    /// Placeholder shown in the empty input.
    #[serde(default)]
    pub placeholder: Option<String>,

    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,
}

/// Resolved configuration after applying precedence rules.
///
/// Created by merging defaults, config file, env vars, and CLI args.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Provider credential.
    pub api_key: Option<String>,
    /// Country restriction, `None` for worldwide.
    pub country: Option<String>,
    /// Place-type filter.
    pub place_types: String,
    /// Response language.
    pub language: String,
    /// Debounce window in milliseconds.
    pub debounce_ms: u64,
    /// Guard window in milliseconds.
    pub selection_guard_ms: u64,
    /// Minimum trimmed query length.
    pub min_query_chars: usize,
    /// Offline gazetteer file.
    pub gazetteer: Option<PathBuf>,
    /// Input placeholder.
    pub placeholder: String,
    /// Path to log file for tracing output.
    pub log_file_path: PathBuf,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            country: Some(DEFAULT_COUNTRY.to_string()),
            place_types: DEFAULT_PLACE_TYPES.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            debounce_ms: millis(DEFAULT_DEBOUNCE),
            selection_guard_ms: millis(DEFAULT_SELECTION_GUARD),
            min_query_chars: DEFAULT_MIN_QUERY_CHARS,
            gazetteer: None,
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            log_file_path: default_log_path(),
        }
    }
}

impl ResolvedConfig {
    /// Controller settings derived from this config.
    ///
    /// In gazetteer mode the gazetteer path stands in for the credential, so
    /// each distinct file is loaded once.
    pub fn controller_settings(&self) -> ControllerSettings {
        let credential = match &self.gazetteer {
            Some(path) => Some(path.display().to_string()),
            None => self.api_key.clone(),
        };
        ControllerSettings {
            credential,
            country: self.country.clone(),
            place_types: self.place_types.clone(),
            debounce: Duration::from_millis(self.debounce_ms),
            selection_guard: Duration::from_millis(self.selection_guard_ms),
            min_query_chars: self.min_query_chars,
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Blank country means "no restriction"; codes are lowercased.
fn normalize_country(raw: String) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_ascii_lowercase())
    }
}

/// Blank credentials count as absent.
fn normalize_key(raw: String) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Resolve default log file path.
///
/// Returns `~/.local/state/placepick/placepick.log` on Linux, or the
/// platform state directory elsewhere. Falls back to the current directory.
pub fn default_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        state_dir.join("placepick").join("placepick.log")
    } else {
        PathBuf::from("placepick.log")
    }
}

/// Load configuration file from a specific path.
///
/// Returns `Ok(None)` if file doesn't exist (not an error - use defaults).
///
/// # Errors
///
/// Returns error if file exists but has read or parse errors.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();

    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let config: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(Some(config))
}

/// Resolve default config file path.
///
/// Returns `~/.config/placepick/config.toml` on Unix, appropriate path on
/// other platforms. Returns `None` if home directory cannot be determined.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("placepick").join("config.toml"))
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (CLI `--config`)
/// 2. `PLACEPICK_CONFIG` environment variable
/// 3. Default path `~/.config/placepick/config.toml`
///
/// # Errors
///
/// Returns error only if a config file exists but cannot be read or parsed.
pub fn load_config_with_precedence(
    config_path: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    if let Some(path) = config_path {
        return load_config_file(path);
    }

    if let Ok(env_path) = std::env::var(ENV_CONFIG) {
        return load_config_file(PathBuf::from(env_path));
    }

    if let Some(default_path) = default_config_path() {
        return load_config_file(default_path);
    }

    Ok(None)
}

/// Merge config file into defaults to create resolved config.
pub fn merge_config(config_file: Option<ConfigFile>) -> ResolvedConfig {
    let defaults = ResolvedConfig::default();

    let Some(config) = config_file else {
        return defaults;
    };

    ResolvedConfig {
        api_key: config.api_key.and_then(normalize_key),
        country: match config.country {
            Some(country) => normalize_country(country),
            None => defaults.country,
        },
        place_types: config.place_types.unwrap_or(defaults.place_types),
        language: config.language.unwrap_or(defaults.language),
        debounce_ms: config.debounce_ms.unwrap_or(defaults.debounce_ms),
        selection_guard_ms: config
            .selection_guard_ms
            .unwrap_or(defaults.selection_guard_ms),
        min_query_chars: config.min_query_chars.unwrap_or(defaults.min_query_chars),
        gazetteer: config.gazetteer,
        placeholder: config.placeholder.unwrap_or(defaults.placeholder),
        log_file_path: config.log_file_path.unwrap_or(defaults.log_file_path),
    }
}

/// Apply environment variable overrides to resolved config.
///
/// Checks for:
/// - `PLACEPICK_API_KEY`, else `GOOGLE_MAPS_API_KEY`: credential
/// - `PLACEPICK_COUNTRY`: country restriction (empty disables it)
/// - `PLACEPICK_LANGUAGE`: response language
pub fn apply_env_overrides(mut config: ResolvedConfig) -> ResolvedConfig {
    let api_key = std::env::var(ENV_API_KEY)
        .ok()
        .and_then(normalize_key)
        .or_else(|| std::env::var(ENV_GOOGLE_API_KEY).ok().and_then(normalize_key));
    if let Some(key) = api_key {
        config.api_key = Some(key);
    }

    if let Ok(country) = std::env::var(ENV_COUNTRY) {
        config.country = normalize_country(country);
    }

    if let Ok(language) = std::env::var(ENV_LANGUAGE) {
        config.language = language;
    }

    config
}

/// Values given on the command line. `None` means "not given".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOverrides {
    /// `--api-key`
    pub api_key: Option<String>,
    /// `--country`
    pub country: Option<String>,
    /// `--types`
    pub place_types: Option<String>,
    /// `--language`
    pub language: Option<String>,
    /// `--gazetteer`
    pub gazetteer: Option<PathBuf>,
}

/// Apply CLI argument overrides to resolved config.
///
/// Precedence chain: Defaults → Config File → Env Vars → CLI Args (highest)
pub fn apply_cli_overrides(mut config: ResolvedConfig, cli: CliOverrides) -> ResolvedConfig {
    if let Some(key) = cli.api_key.and_then(normalize_key) {
        config.api_key = Some(key);
    }
    if let Some(country) = cli.country {
        config.country = normalize_country(country);
    }
    if let Some(types) = cli.place_types {
        config.place_types = types;
    }
    if let Some(language) = cli.language {
        config.language = language;
    }
    if let Some(path) = cli.gazetteer {
        config.gazetteer = Some(path);
    }
    config
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
