// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0
#![allow(dead_code)]

//! Test fixtures for detection service testing
//!
//! This module provides canned provider responses, sample images and a
//! service builder pointed at a mock provider.

pub mod hive;

pub use hive::*;

use std::{sync::Once, time::Duration};

use api_client::ImageFile;
use detector::{DetectionService, DetectorConfig};
use url::Url;
use wiremock::MockServer;

pub const TEST_API_KEY: &str = "test-api-key";
pub const TASK_PATH: &str = "/api/v2/task/sync";

static TRACING: Once = Once::new();

/// Route service logs to the test output; `RUST_LOG` selects the level
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Configuration pointed at the mock server, without pacing or credential
pub fn test_config(mock_server: &MockServer) -> DetectorConfig {
    let endpoint = Url::parse(&format!("{}{TASK_PATH}", mock_server.uri())).unwrap();
    DetectorConfig::for_testing().with_endpoint(endpoint)
}

/// Service with a configured key and the given dispatch interval
pub fn keyed_service(mock_server: &MockServer, interval: Duration) -> DetectionService {
    init_tracing();
    let config = test_config(mock_server)
        .with_api_key(TEST_API_KEY)
        .with_min_request_interval(interval);
    DetectionService::new(config).unwrap()
}

/// Service without any resolvable key
pub fn keyless_service(mock_server: &MockServer) -> DetectionService {
    init_tracing();
    DetectionService::new(test_config(mock_server)).unwrap()
}

/// Sample upload of a given type and size
pub fn image(mime_type: &str, size: usize) -> ImageFile {
    let extension = mime_type.rsplit('/').next().unwrap_or("bin");
    ImageFile::new(format!("sample.{extension}"), mime_type, vec![b'x'; size])
}
