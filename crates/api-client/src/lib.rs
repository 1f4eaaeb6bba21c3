// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Generic API client traits and request types for image detection providers
//!
//! This crate provides the seam between the detection service and the
//! third-party classifiers it calls.
//!
//! # Core Abstractions
//!
//! - **`DetectionApi` Trait**: dispatch a prepared request and normalize the raw reply
//! - **Error Handling**: `ApiError` separates transport failures from provider-reported ones
//! - **Request Types**: [`ImageFile`], [`AnalysisInput`] and [`ProviderRequest`]
//! - **Credentials**: [`ApiKey`] guarantees a non-empty token and never prints it

use serde_json::Value;
use shared_types::{AnalysisResult, ErrorKind};
use thiserror::Error;

pub mod credential;
pub mod types;

pub use credential::ApiKey;
pub use types::*;

/// Generic trait for image detection providers
///
/// Implementations perform exactly one network call per [`DetectionApi::classify`]
/// and never retry on their own.
pub trait DetectionApi: Send + Sync {
    /// Send a prepared request to the provider
    ///
    /// # Returns
    ///
    /// * `Ok(value)` with the provider's JSON body when the provider reports success
    /// * `Err(error)` with a transport or provider-reported failure
    ///
    /// # Errors
    ///
    /// Returns a transport error ([`ApiError::is_transport`]) when no response was
    /// received, and a provider error otherwise
    fn classify(
        &self,
        request: ProviderRequest,
    ) -> impl Future<Output = Result<Value, ApiError>> + Send;

    /// Convert a raw provider body into a normalized result
    ///
    /// Must not fail: malformed bodies produce a zero-confidence result with an
    /// explanatory detail line.
    fn normalize(&self, raw: &Value) -> AnalysisResult;

    /// Get the name/identifier of this provider
    fn name(&self) -> &'static str;
}

/// Common errors that can occur when talking to a detection provider
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum ApiError {
    /// No response was received (DNS, refused connection, reset)
    #[error("Network error: {message}")]
    Network { message: String },

    /// The provider did not answer in time
    #[error("Request timeout after {timeout_seconds} seconds")]
    Timeout { timeout_seconds: u64 },

    /// A response was received with a failure status or error envelope
    #[error("Provider error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The provider rejected the credential
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// The provider throttled the request
    #[error("Rate limit exceeded by provider")]
    RateLimited { retry_after_seconds: Option<u64> },

    /// The provider answered with a body that could not be read as JSON
    #[error("Invalid response format: {message}")]
    InvalidResponse { message: String },

    /// The request could not be constructed
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl ApiError {
    /// Check if this error means the provider was never reached
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Network { .. } | ApiError::Timeout { .. })
    }

    /// Map this error onto the caller-facing error vocabulary
    pub fn kind(&self) -> ErrorKind {
        if self.is_transport() {
            ErrorKind::NetworkError
        } else {
            ErrorKind::ApiError
        }
    }
}
