//! Error types for placepick.
//!
//! Errors use `thiserror` and compose via `?` and `From` conversions.
//!
//! # Error Hierarchy
//!
//! - [`AppError`] - top-level binary error (config, logging, terminal, output)
//! - [`InitError`] - a provider backend could not be loaded for a credential
//! - [`ProviderError`] - a single predictions or details request failed
//!
//! # Recovery Strategy
//!
//! The place controller never returns errors to its caller. Provider failures
//! become state transitions (an inline error row) or a degraded result. Only
//! the binary shell propagates errors, and only for startup and terminal I/O.

use crate::config::ConfigError;
use crate::logging::LoggingError;
use std::fmt;
use thiserror::Error;

/// Status reported by a places provider.
///
/// Names follow the Google Places vocabulary. Unrecognized names are kept
/// verbatim so they can still be shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProviderStatus {
    /// Request succeeded.
    Ok,
    /// Request succeeded with no matches.
    ZeroResults,
    /// Quota exhausted.
    OverQueryLimit,
    /// Credential rejected or API not enabled.
    RequestDenied,
    /// Malformed request (missing input, bad place id).
    InvalidRequest,
    /// Place id no longer exists.
    NotFound,
    /// Server-side failure; retrying may succeed.
    UnknownError,
    /// Any other status name.
    Other(String),
}

impl ProviderStatus {
    /// Parse a wire status name.
    pub fn from_name(name: &str) -> Self {
        match name {
            "OK" => Self::Ok,
            "ZERO_RESULTS" => Self::ZeroResults,
            "OVER_QUERY_LIMIT" => Self::OverQueryLimit,
            "REQUEST_DENIED" => Self::RequestDenied,
            "INVALID_REQUEST" => Self::InvalidRequest,
            "NOT_FOUND" => Self::NotFound,
            "UNKNOWN_ERROR" => Self::UnknownError,
            other => Self::Other(other.to_string()),
        }
    }

    /// Wire status name.
    pub fn name(&self) -> &str {
        match self {
            Self::Ok => "OK",
            Self::ZeroResults => "ZERO_RESULTS",
            Self::OverQueryLimit => "OVER_QUERY_LIMIT",
            Self::RequestDenied => "REQUEST_DENIED",
            Self::InvalidRequest => "INVALID_REQUEST",
            Self::NotFound => "NOT_FOUND",
            Self::UnknownError => "UNKNOWN_ERROR",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for ProviderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single provider request failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// Provider answered with a non-OK, non-zero-result status.
    #[error("{0}")]
    Status(ProviderStatus),

    /// Network or HTTP failure before a status could be read.
    #[error("TRANSPORT_ERROR ({0})")]
    Transport(String),

    /// Response body could not be decoded.
    #[error("DECODE_ERROR ({0})")]
    Decode(String),
}

impl ProviderError {
    /// Message shown in the suggestion list when a query fails.
    pub fn user_message(&self) -> String {
        format!("Places provider error: {self}")
    }
}

/// A provider backend could not be initialized.
///
/// A controller that hits this stays inert: query attempts become no-ops.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InitError {
    /// No credential was configured.
    #[error("Missing places provider credential")]
    MissingCredential,

    /// The backend failed to load (bad dataset, HTTP client construction).
    #[error("Failed to load places provider: {0}")]
    Load(String),
}

/// Top-level error for the `placepick` binary.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration file could not be read or parsed.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Logging could not be initialized.
    #[error("Logging error: {0}")]
    Logging(#[from] LoggingError),

    /// Terminal or TUI rendering error.
    #[error("Terminal error: {0}")]
    Terminal(#[from] crate::view::TuiError),

    /// Result could not be serialized for output.
    #[error("Output error: {0}")]
    Output(#[from] serde_json::Error),
}
