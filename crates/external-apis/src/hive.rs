// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Hive AI detection API integration
//!
//! This module provides an implementation of the `DetectionApi` trait for the
//! Hive synchronous task endpoint. One call performs exactly one POST; the
//! client never retries, and it keeps transport failures (no response) apart
//! from failures the provider reports.

use std::time::Duration;

use api_client::{ApiError, DetectionApi, ProviderRequest, RequestBody};
use reqwest::{
    Client, StatusCode,
    header::{ACCEPT, AUTHORIZATION, RETRY_AFTER},
    multipart::{Form, Part},
};
use serde_json::Value;
use shared_types::AnalysisResult;
use thiserror::Error;
use tokio::time::timeout;
use tracing::{debug, info, warn};
use url::Url;

use crate::normalizer::{first_entry, normalize};

/// Default Hive synchronous task endpoint
pub const DEFAULT_HIVE_ENDPOINT: &str = "https://api.thehive.ai/api/v2/task/sync";

// Hive API constants
const DEFAULT_HIVE_TIMEOUT_SECONDS: u64 = 30;
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Configuration for the Hive API client
#[derive(Debug, Clone)]
pub struct HiveConfig {
    /// Task endpoint receiving the multipart POST
    pub endpoint: Url,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl HiveConfig {
    /// Create a new `HiveConfig` with validation
    pub fn new(endpoint: &str, timeout_seconds: u64) -> Result<Self, HiveError> {
        let endpoint = Url::parse(endpoint.trim())
            .map_err(|e| HiveError::Config(format!("Invalid endpoint '{endpoint}': {e}")))?;

        if timeout_seconds == 0 {
            return Err(HiveError::Config(
                "Timeout must be greater than 0".to_string(),
            ));
        }

        Ok(Self {
            endpoint,
            timeout_seconds,
        })
    }
}

impl Default for HiveConfig {
    fn default() -> Self {
        Self {
            endpoint: Url::parse(DEFAULT_HIVE_ENDPOINT).expect("default Hive URL is valid"),
            timeout_seconds: DEFAULT_HIVE_TIMEOUT_SECONDS,
        }
    }
}

/// Hive API client implementation
#[derive(Debug, Clone)]
pub struct HiveClient {
    client: Client,
    config: HiveConfig,
}

/// Errors specific to the Hive API client
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum HiveError {
    /// HTTP request failed before a response was received
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not valid JSON
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// API returned a non-success status
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// API returned a success status with an error envelope in the body
    #[error("API reported failure: {message}")]
    Envelope { message: String },

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimited { retry_after_seconds: Option<u64> },

    /// Authentication failed
    #[error("Authentication failed: {message}")]
    Unauthorized { message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Timeout error
    #[error("Request timeout")]
    Timeout { seconds: u64 },
}

impl From<HiveError> for ApiError {
    fn from(value: HiveError) -> Self {
        match value {
            HiveError::Http(error) if error.is_builder() => ApiError::Configuration {
                message: error.to_string(),
            },
            HiveError::Http(error) => ApiError::Network {
                message: error.to_string(),
            },
            HiveError::Json(error) => ApiError::InvalidResponse {
                message: error.to_string(),
            },
            HiveError::ApiError { status, message } => ApiError::Api { status, message },
            HiveError::Envelope { message } => ApiError::Api {
                status: StatusCode::OK.as_u16(),
                message,
            },
            HiveError::RateLimited {
                retry_after_seconds,
            } => ApiError::RateLimited {
                retry_after_seconds,
            },
            HiveError::Unauthorized { message } => ApiError::Authentication { message },
            HiveError::Config(message) => ApiError::Configuration { message },
            HiveError::Timeout { seconds } => ApiError::Timeout {
                timeout_seconds: seconds,
            },
        }
    }
}

impl HiveClient {
    /// Create a new Hive API client
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created
    pub fn new(config: HiveConfig) -> Result<Self, HiveError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("image-detector/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(HiveError::Http)?;

        info!(
            endpoint = %config.endpoint,
            timeout_seconds = config.timeout_seconds,
            "created Hive client"
        );

        Ok(Self { client, config })
    }

    /// Endpoint this client posts to
    pub fn endpoint(&self) -> &Url {
        &self.config.endpoint
    }

    /// Submit a prepared request to the Hive task endpoint
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be sent, times out, or the
    /// provider reports a failure
    pub async fn submit(&self, request: ProviderRequest) -> Result<Value, HiveError> {
        let source = match &request.body {
            RequestBody::Media { .. } => "media",
            RequestBody::Url { .. } => "url",
        };
        let form = Self::form(request.body)?;

        debug!(endpoint = %self.config.endpoint, source, "submitting task to Hive");

        let builder = self
            .client
            .post(self.config.endpoint.clone())
            .header(AUTHORIZATION, request.authorization)
            .header(ACCEPT, "application/json")
            .multipart(form);

        let exchange = async {
            let response = builder.send().await?;
            let status = response.status();
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok());
            let body = match response.text().await {
                Ok(body) => body,
                // A failure status was received; a truncated body does not make it a transport error
                Err(e) if !status.is_success() => {
                    warn!(status = status.as_u16(), error = %e, "failed to read Hive error body");
                    String::new()
                }
                Err(e) => return Err(e),
            };
            Ok::<_, reqwest::Error>((status, retry_after, body))
        };

        let (status, retry_after, body) =
            timeout(Duration::from_secs(self.config.timeout_seconds), exchange)
                .await
                .map_err(|_| HiveError::Timeout {
                    seconds: self.config.timeout_seconds,
                })?
                .map_err(HiveError::Http)?;

        debug!(status = status.as_u16(), bytes = body.len(), "received Hive response");

        if !status.is_success() {
            return Err(Self::status_error(status, retry_after, &body));
        }

        let value: Value = serde_json::from_str(&body)?;
        if let Some(message) = error_envelope(&value) {
            warn!(%message, "Hive returned an error envelope with a success status");
            return Err(HiveError::Envelope { message });
        }

        Ok(value)
    }

    /// Encode a request body as the multipart form Hive expects
    fn form(body: RequestBody) -> Result<Form, HiveError> {
        match body {
            RequestBody::Media {
                file_name,
                mime_type,
                bytes,
            } => {
                let part = Part::bytes(bytes)
                    .file_name(file_name)
                    .mime_str(&mime_type)
                    .map_err(|e| {
                        HiveError::Config(format!("Invalid MIME type '{mime_type}': {e}"))
                    })?;
                Ok(Form::new().part("media", part))
            }
            RequestBody::Url { url } => Ok(Form::new().text("url", url)),
        }
    }

    /// Map a non-success status to an error
    fn status_error(status: StatusCode, retry_after: Option<u64>, body: &str) -> HiveError {
        let message = error_message(body).unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_string()
        });
        warn!(status = status.as_u16(), %message, "Hive API error");

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => HiveError::Unauthorized { message },
            StatusCode::TOO_MANY_REQUESTS => HiveError::RateLimited {
                retry_after_seconds: retry_after,
            },
            status => HiveError::ApiError {
                status: status.as_u16(),
                message,
            },
        }
    }
}

impl DetectionApi for HiveClient {
    async fn classify(&self, request: ProviderRequest) -> Result<Value, ApiError> {
        self.submit(request).await.map_err(ApiError::from)
    }

    fn normalize(&self, raw: &Value) -> AnalysisResult {
        normalize(raw)
    }

    fn name(&self) -> &'static str {
        "hive"
    }
}

/// Extract a readable message from an error body, JSON or plain text
fn error_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }

    if let Ok(value) = serde_json::from_str::<Value>(body) {
        let message = value
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| value.get("error").and_then(message_of))
            .or_else(|| task_status(&value).and_then(|s| s.get("message").and_then(message_of)));
        if message.is_some() {
            return message;
        }
    }

    Some(body.chars().take(MAX_ERROR_BODY_CHARS).collect())
}

/// Detect a failure reported inside a success-status body
fn error_envelope(value: &Value) -> Option<String> {
    if let Some(error) = value.get("error").filter(|e| !e.is_null()) {
        return Some(message_of(error).unwrap_or_else(|| "provider reported an error".to_string()));
    }

    if let Some(code) = value.get("code").and_then(status_code)
        && is_failure_code(code)
    {
        let message = value.get("message").and_then(message_of);
        return Some(message.unwrap_or_else(|| format!("provider reported code {code}")));
    }

    let status = task_status(value)?;
    let code = status.get("code").and_then(status_code)?;
    if !is_failure_code(code) {
        return None;
    }

    let message = status.get("message").and_then(message_of);
    Some(message.unwrap_or_else(|| format!("provider reported task status {code}")))
}

/// The per-task `status` object of the first task entry
fn task_status(value: &Value) -> Option<&Value> {
    let task = first_entry(value.get("status")?);
    task.get("status").filter(|s| s.is_object())
}

fn message_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Object(map) => map.get("message").and_then(message_of),
        _ => None,
    }
}

fn status_code(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn is_failure_code(code: i64) -> bool {
    code != 0 && !(200..300).contains(&code)
}
