// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! AI-generated image detection
//!
//! This crate submits images to a third-party classifier (Hive) and returns a
//! normalized verdict: a confidence score, a binary AI/not-AI decision and a
//! breakdown of the generator families the classifier recognized.
//!
//! # Key Features
//!
//! - **Uniform results**: every entry point returns a [`ServiceResult`]; nothing is thrown
//! - **Pre-dispatch validation**: unsupported types and oversized files never reach the network
//! - **Rate limiting**: requests leave the client at least a minimum interval apart,
//!   however many analyses are in flight
//! - **Layered credentials**: runtime override, configured key, then a persisted key
//! - **Observability**: `tracing` spans with a per-call request id
//!
//! # Architecture
//!
//! - [`service`]: the [`DetectionService`] entry points and pipeline
//! - [`config`]: configuration loading and validation
//! - [`credentials`]: credential chain and stores
//! - [`validator`]: MIME type and size checks
//! - [`rate_limiter`]: dispatch pacing
//! - [`error`]: pipeline errors and their classification
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use api_client::ImageFile;
//! use detector::{DetectionService, DetectorConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = DetectorConfig::from_env()?;
//! let service = DetectionService::new(config)?;
//!
//! if !service.has_api_key() {
//!     service.set_api_key("your-hive-api-key");
//! }
//!
//! let image = ImageFile::from_path("photo.jpg").await?;
//! let result = service.analyze_image(image).await;
//!
//! if result.success {
//!     println!("AI-generated: {}", result.data.is_ai_generated);
//!     for line in result.data.details() {
//!         println!("  {line}");
//!     }
//! } else {
//!     println!("Analysis failed: {:?}", result.error);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod credentials;
pub mod error;
pub mod rate_limiter;
pub mod service;
pub mod validator;

// Re-export main types for convenience
pub use config::DetectorConfig;
pub use credentials::{
    API_KEY_STORAGE_KEY, CredentialProvider, CredentialResolver, CredentialStore, FileStore,
    MemoryStore,
};
pub use error::{DetectorError, DetectorResult, Stage, classify};
pub use rate_limiter::RateLimiter;
pub use service::{DetectionService, service_info};
pub use shared_types::{AnalysisResult, ErrorKind, ServiceInfo, ServiceResult};
pub use validator::RequestValidator;
