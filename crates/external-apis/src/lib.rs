// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! External image detection provider integrations
//!
//! This crate provides the Hive AI implementation of the `DetectionApi` trait,
//! split along the stages a request goes through:
//!
//! - **Request Building**: [`request`] turns a validated input and credential into a `ProviderRequest`
//! - **Dispatch**: [`hive`] performs the HTTP call and separates transport failures from provider errors
//! - **Normalization**: [`normalizer`] maps Hive's nested classification output into an `AnalysisResult`
//! - **Display Names**: [`generators`] rewrites provider generator slugs into readable names
//!
//! Every stage is covered by wiremock-backed integration tests.

pub mod generators;
pub mod hive;
pub mod normalizer;
pub mod request;

pub use hive::*;
pub use normalizer::{DECISION_THRESHOLD, HIVE_MODEL, NOISE_FLOOR, normalize};
pub use request::build_request;
