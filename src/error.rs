//! Error types for the lease analyzer
//!
//! Validation failures are raised synchronously before any network activity.
//! Analysis failures split into two kinds so callers can tell
//! "could not reach the service" apart from "the service rejected the request".

use serde::Serialize;
use thiserror::Error;

/// Generic message shown when the service cannot be reached or answers garbage
pub const TRANSPORT_FAILURE_MESSAGE: &str =
    "Could not reach the analysis service. Please check your connection and try again.";

/// Fallback when the service rejects a request without a readable reason
pub const GENERIC_SERVICE_FAILURE_MESSAGE: &str = "Analysis failed";

/// Client-side input rejection
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("File size must be less than 10MB")]
    TooLarge { size: u64, limit: u64 },

    #[error("Please upload a supported file format (PDF, DOC, DOCX, TXT, RTF, JPG, PNG)")]
    UnsupportedType(String),

    #[error("Please upload a file or enter text to analyze")]
    EmptyPayload,
}

/// Which side of the exchange failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Service unreachable, timed out, or returned an unparsable success body
    Transport,
    /// Service answered with an error status
    Service,
}

/// Failure of a single analysis exchange
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Service error ({status}): {message}")]
    Service { status: u16, message: String },
}

impl AnalysisError {
    pub fn kind(&self) -> FailureKind {
        match self {
            AnalysisError::Transport(_) => FailureKind::Transport,
            AnalysisError::Service { .. } => FailureKind::Service,
        }
    }

    /// Message suitable for showing to the user
    pub fn user_message(&self) -> String {
        match self {
            AnalysisError::Transport(_) => TRANSPORT_FAILURE_MESSAGE.to_string(),
            AnalysisError::Service { message, .. } => message.clone(),
        }
    }
}

impl From<reqwest::Error> for AnalysisError {
    fn from(e: reqwest::Error) -> Self {
        AnalysisError::Transport(e.to_string())
    }
}

/// Rejected workflow action
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("An analysis is already in progress")]
    Busy,

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Invalid configuration value
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid API base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("Invalid timeout '{0}': expected a whole number of seconds")]
    InvalidTimeout(String),
}

/// Identity session persistence failure
#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("Failed to access identity session at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
