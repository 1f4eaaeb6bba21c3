// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Shared types for the image detector
//!
//! This crate provides the result envelope and error vocabulary that every
//! crate in the workspace speaks, avoiding circular dependencies between the
//! provider integrations and the detection service.

pub mod analysis;
pub mod error_kind;

pub use analysis::{
    Analysis, AnalysisResult, Breakdown, ERROR_MODEL, GeneratorScore, ServiceInfo, ServiceResult,
    format_percentage,
};
pub use error_kind::ErrorKind;
