// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Main detection orchestrator
//!
//! [`DetectionService`] runs every analysis through the same pipeline:
//! validation, credential check, rate limiting, request building, dispatch
//! and normalization. Each entry point returns a [`ServiceResult`]; failures
//! are classified at this boundary and never propagate to the caller.

use std::{fmt, sync::Arc};

use api_client::{AnalysisInput, DetectionApi, ImageFile};
use external_apis::{HiveClient, build_request};
use futures::future::join_all;
use shared_types::{ServiceInfo, ServiceResult};
use tracing::{Span, debug, error, info, instrument};
use uuid::Uuid;

use crate::{
    config::DetectorConfig,
    credentials::{CredentialResolver, CredentialStore, FileStore, MemoryStore},
    error::{DetectorError, DetectorResult, Stage, classify},
    rate_limiter::RateLimiter,
    validator::RequestValidator,
};

/// Display name reported by [`DetectionService::get_service_info`]
pub const SERVICE_NAME: &str = "Hive AI Image Detector";

/// Capabilities reported by [`DetectionService::get_service_info`]
pub const CAPABILITIES: [&str; 4] = [
    "file-analysis",
    "url-analysis",
    "generator-breakdown",
    "rate-limiting",
];

/// AI-generated image detection service
///
/// Cloning is cheap and clones share the credential state and the rate
/// limiter, so concurrent calls through any clone are paced together.
pub struct DetectionService<C = HiveClient> {
    inner: Arc<Inner<C>>,
}

struct Inner<C> {
    config: DetectorConfig,
    client: C,
    validator: RequestValidator,
    limiter: RateLimiter,
    credentials: CredentialResolver,
}

impl DetectionService<HiveClient> {
    /// Create a service talking to Hive, with the credential store named by
    /// the configuration
    ///
    /// # Errors
    ///
    /// Returns `DetectorError::Configuration` if the configuration is invalid
    /// or the HTTP client cannot be created
    pub fn new(config: DetectorConfig) -> DetectorResult<Self> {
        let store: Arc<dyn CredentialStore> = match &config.credential_store_path {
            Some(path) => {
                let store = FileStore::new(path);
                debug!(path = %store.path().display(), "persisting credentials to file");
                Arc::new(store)
            }
            None => Arc::new(MemoryStore::new()),
        };
        Self::with_store(config, store)
    }

    /// Create a service talking to Hive with an explicit credential store
    ///
    /// # Errors
    ///
    /// Returns `DetectorError::Configuration` if the configuration is invalid
    /// or the HTTP client cannot be created
    pub fn with_store(
        config: DetectorConfig,
        store: Arc<dyn CredentialStore>,
    ) -> DetectorResult<Self> {
        config.validate()?;
        let client = HiveClient::new(config.hive_config()).map_err(DetectorError::config)?;
        Self::with_client(config, client, store)
    }
}

impl<C: DetectionApi> DetectionService<C> {
    /// Create a service around any detection provider
    ///
    /// # Errors
    ///
    /// Returns `DetectorError::Configuration` if the configuration is invalid
    pub fn with_client(
        config: DetectorConfig,
        client: C,
        store: Arc<dyn CredentialStore>,
    ) -> DetectorResult<Self> {
        config.validate()?;

        let inner = Inner {
            validator: RequestValidator::from_config(&config),
            limiter: RateLimiter::new(config.min_request_interval()),
            credentials: CredentialResolver::new(config.api_key(), store),
            client,
            config,
        };

        info!(
            provider = inner.client.name(),
            endpoint = %inner.config.provider_endpoint,
            min_interval = ?inner.limiter.min_interval(),
            credential = inner.credentials.has_credential(),
            "DetectionService initialized"
        );

        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    /// Analyze an uploaded image
    #[instrument(skip(self, file), fields(
        request_id,
        file_name = file.name(),
        mime_type = file.mime_type(),
        size_bytes = file.size()
    ))]
    pub async fn analyze_image(&self, file: ImageFile) -> ServiceResult {
        Span::current().record("request_id", Uuid::new_v4().to_string());

        let file = match self.inner.validator.validate(&file) {
            Ok(mime_type) => file.with_mime_type(mime_type),
            Err(e) => return classify(Stage::Validation, &e),
        };

        self.dispatch(AnalysisInput::File(file)).await
    }

    /// Analyze a remote image; the provider fetches the URL itself
    #[instrument(skip(self), fields(request_id))]
    pub async fn analyze_image_from_url(&self, url: &str) -> ServiceResult {
        Span::current().record("request_id", Uuid::new_v4().to_string());

        self.dispatch(AnalysisInput::Url(url.to_string())).await
    }

    /// Analyze several uploads concurrently, returning results in input order
    ///
    /// Dispatches are still spaced by the rate limiter.
    #[instrument(skip(self, files), fields(batch_id, count = files.len()))]
    pub async fn analyze_batch(&self, files: Vec<ImageFile>) -> Vec<ServiceResult> {
        Span::current().record("batch_id", Uuid::new_v4().to_string());
        debug!("starting batch analysis");
        join_all(files.into_iter().map(|file| self.analyze_image(file))).await
    }

    /// Static service descriptor
    pub fn get_service_info(&self) -> ServiceInfo {
        service_info()
    }

    /// Replace the API key, or clear it with an empty string
    ///
    /// The new key applies immediately. A failure to persist it is logged and
    /// does not undo the in-memory change.
    pub fn set_api_key(&self, token: &str) {
        if let Err(e) = self.inner.credentials.set_credential(token) {
            error!(error = %e, "failed to persist API key");
        }
    }

    /// Check whether an API key is currently available
    pub fn has_api_key(&self) -> bool {
        self.inner.credentials.has_credential()
    }

    /// Active configuration
    pub fn config(&self) -> &DetectorConfig {
        &self.inner.config
    }

    /// Credential check, rate limit, build, send and normalize
    async fn dispatch(&self, input: AnalysisInput) -> ServiceResult {
        let Some(api_key) = self.inner.credentials.resolve() else {
            return classify(Stage::Credential, &DetectorError::MissingApiKey);
        };

        let source = input.source();
        let waited = self.inner.limiter.acquire().await;
        let request = build_request(input, &api_key);

        debug!(
            provider = self.inner.client.name(),
            source,
            waited_ms = u64::try_from(waited.as_millis()).unwrap_or(u64::MAX),
            "dispatching analysis request"
        );

        let raw = match self.inner.client.classify(request).await {
            Ok(raw) => raw,
            Err(e) => return classify(Stage::Dispatch, &DetectorError::Provider(e)),
        };

        let result = self.inner.client.normalize(&raw);
        info!(
            confidence = result.confidence,
            is_ai_generated = result.is_ai_generated,
            generators = result.generators().len(),
            "analysis complete"
        );

        ServiceResult::success(result)
    }
}

impl<C> Clone for DetectionService<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C> fmt::Debug for DetectionService<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DetectionService")
            .field("config", &self.inner.config)
            .field("credentials", &self.inner.credentials)
            .field("limiter", &self.inner.limiter)
            .finish_non_exhaustive()
    }
}

/// Static service descriptor; needs no network or state access
pub fn service_info() -> ServiceInfo {
    ServiceInfo {
        name: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        capabilities: CAPABILITIES.iter().map(|c| (*c).to_string()).collect(),
    }
}
