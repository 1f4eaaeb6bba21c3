// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for detection operations
//!
//! [`DetectorError`] covers every failure in the analysis pipeline.
//! [`classify`] turns one into the uniform [`ServiceResult`] envelope that the
//! public entry points return.

use std::fmt;

use api_client::ApiError;
use shared_types::{ErrorKind, ServiceResult};
use thiserror::Error;
use tracing::warn;

/// Result type alias for detection operations
pub type DetectorResult<T> = Result<T, DetectorError>;

/// Error types for detection operations
#[derive(Debug, Error)]
pub enum DetectorError {
    /// No credential could be resolved
    #[error("No detection API key is configured")]
    MissingApiKey,

    /// MIME type outside the accepted set
    #[error("Unsupported file type '{mime_type}' (accepted: {})", .accepted.join(", "))]
    InvalidFileType {
        /// Declared MIME type of the rejected file
        mime_type: String,
        /// Accepted MIME types
        accepted: Vec<String>,
    },

    /// Payload above the size ceiling
    #[error("File is {size_bytes} bytes, the limit is {max_bytes} bytes")]
    FileTooLarge {
        /// Payload length
        size_bytes: u64,
        /// Configured ceiling
        max_bytes: u64,
    },

    /// Provider call failed
    #[error(transparent)]
    Provider(#[from] ApiError),

    /// Invalid configuration
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the problem
        message: String,
    },

    /// Credential store failure
    #[error("Credential storage error: {message}")]
    Storage {
        /// Description of the problem
        message: String,
    },
}

impl DetectorError {
    /// Create a configuration error
    pub fn config<T: ToString>(message: T) -> Self {
        Self::Configuration {
            message: message.to_string(),
        }
    }

    /// Create a storage error
    pub fn storage<T: ToString>(message: T) -> Self {
        Self::Storage {
            message: message.to_string(),
        }
    }

    /// Map this error onto the caller-facing error vocabulary
    pub fn kind(&self) -> ErrorKind {
        match self {
            DetectorError::MissingApiKey | DetectorError::Storage { .. } => {
                ErrorKind::ApiKeyMissing
            }
            DetectorError::InvalidFileType { .. } => ErrorKind::InvalidFileType,
            DetectorError::FileTooLarge { .. } => ErrorKind::FileTooLarge,
            DetectorError::Provider(error) => error.kind(),
            DetectorError::Configuration { .. } => ErrorKind::ApiError,
        }
    }
}

impl From<anyhow::Error> for DetectorError {
    fn from(error: anyhow::Error) -> Self {
        Self::config(error)
    }
}

/// Pipeline stage at which a failure was observed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Input checks before any network access
    Validation,
    /// Credential resolution
    Credential,
    /// Provider call
    Dispatch,
}

impl Stage {
    /// Stable label used in logs
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Validation => "validation",
            Stage::Credential => "credential",
            Stage::Dispatch => "dispatch",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Convert a pipeline failure into a failed [`ServiceResult`]
///
/// The stage is recorded in the log only; callers see the error kind and a
/// message.
pub fn classify(stage: Stage, error: &DetectorError) -> ServiceResult {
    let kind = error.kind();
    warn!(
        stage = %stage,
        kind = %kind,
        pre_dispatch = kind.is_pre_dispatch(),
        error = %error,
        "analysis failed"
    );
    ServiceResult::failure(kind, error.to_string())
}
