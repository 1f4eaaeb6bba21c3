// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Error kinds surfaced to callers of the detection service

use std::fmt;

use serde::{Deserialize, Serialize};

/// Fixed vocabulary of failures reported in a [`crate::ServiceResult`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// No credential could be resolved before dispatch
    ApiKeyMissing,
    /// The image MIME type is not in the accepted set
    InvalidFileType,
    /// The image exceeds the configured size ceiling
    FileTooLarge,
    /// The provider was reached but reported a failure
    ApiError,
    /// The provider could not be reached
    NetworkError,
}

impl ErrorKind {
    /// All error kinds, in declaration order
    pub const ALL: [ErrorKind; 5] = [
        ErrorKind::ApiKeyMissing,
        ErrorKind::InvalidFileType,
        ErrorKind::FileTooLarge,
        ErrorKind::ApiError,
        ErrorKind::NetworkError,
    ];

    /// Stable token for this kind, identical to its serialized form
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ApiKeyMissing => "API_KEY_MISSING",
            ErrorKind::InvalidFileType => "INVALID_FILE_TYPE",
            ErrorKind::FileTooLarge => "FILE_TOO_LARGE",
            ErrorKind::ApiError => "API_ERROR",
            ErrorKind::NetworkError => "NETWORK_ERROR",
        }
    }

    /// Check if the failure happened before anything was sent to the provider
    pub fn is_pre_dispatch(&self) -> bool {
        matches!(
            self,
            ErrorKind::ApiKeyMissing | ErrorKind::InvalidFileType | ErrorKind::FileTooLarge
        )
    }

    /// Get a default user-facing message for this kind
    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorKind::ApiKeyMissing => {
                "API key is missing. Add a detection API key in settings to analyze images."
            }
            ErrorKind::InvalidFileType => {
                "Unsupported file type. Upload a JPEG, PNG, GIF or WebP image."
            }
            ErrorKind::FileTooLarge => "File is too large to be analyzed.",
            ErrorKind::ApiError => "The detection service returned an error.",
            ErrorKind::NetworkError => "Unable to reach the detection service.",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
