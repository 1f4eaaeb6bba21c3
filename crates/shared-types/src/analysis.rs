// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Analysis results and the uniform service envelope
//!
//! Every public entry point of the detection service returns a
//! [`ServiceResult`]. Its `data` field is populated on success and on failure,
//! so a renderer never needs a separate code path for errors.

use serde::{Deserialize, Serialize};

use crate::ErrorKind;

/// Model identifier used for results synthesized on a failure path
pub const ERROR_MODEL: &str = "error";

const FALLBACK_DETAIL: &str = "No analysis details available";

/// A named generator signal with its normalized score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorScore {
    /// Display name of the generator family
    pub name: String,
    /// Score in `[0, 1]`
    pub score: f64,
}

impl GeneratorScore {
    /// Create a generator score, clamping the score into `[0, 1]`
    pub fn new(name: impl Into<String>, score: f64) -> Self {
        Self {
            name: name.into(),
            score: clamp_unit(score),
        }
    }

    /// Score formatted as a percentage with one decimal place
    pub fn percentage(&self) -> String {
        format_percentage(self.score)
    }
}

/// Human-readable and structured breakdown of a verdict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breakdown {
    /// Ordered lines for display, never empty
    pub details: Vec<String>,
    /// Generator signals ordered by descending score
    #[serde(default)]
    pub generators: Vec<GeneratorScore>,
}

/// Backend information attached to a result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    /// Backend that produced the result, or [`ERROR_MODEL`]
    pub model: String,
    /// Detail breakdown
    pub breakdown: Breakdown,
}

/// Normalized verdict for a single image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Likelihood that the image is AI-generated, in `[0, 1]`
    pub confidence: f64,
    /// Whether the confidence crossed the decision threshold
    pub is_ai_generated: bool,
    /// Backend and breakdown
    pub analysis: Analysis,
}

impl AnalysisResult {
    /// Create a result, enforcing a unit-range confidence and a non-empty detail list
    pub fn new(
        confidence: f64,
        is_ai_generated: bool,
        model: impl Into<String>,
        mut details: Vec<String>,
        generators: Vec<GeneratorScore>,
    ) -> Self {
        if details.is_empty() {
            details.push(FALLBACK_DETAIL.to_string());
        }

        Self {
            confidence: clamp_unit(confidence),
            is_ai_generated,
            analysis: Analysis {
                model: model.into(),
                breakdown: Breakdown {
                    details,
                    generators,
                },
            },
        }
    }

    /// Create the placeholder result carried by a failed [`ServiceResult`]
    pub fn error(kind: ErrorKind, message: &str) -> Self {
        let mut details = vec![kind.default_message().to_string()];
        let message = message.trim();
        if !message.is_empty() && message != kind.default_message() {
            details.push(message.to_string());
        }

        Self::new(0.0, false, ERROR_MODEL, details, Vec::new())
    }

    /// Detail lines for display
    pub fn details(&self) -> &[String] {
        &self.analysis.breakdown.details
    }

    /// Generator signals ordered by descending score
    pub fn generators(&self) -> &[GeneratorScore] {
        &self.analysis.breakdown.generators
    }
}

/// Uniform envelope returned by every public entry point
///
/// `data` is always present; `error` and `message` are present exactly when
/// `success` is false.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceResult {
    /// Whether the analysis succeeded
    pub success: bool,
    /// The verdict, or a placeholder on failure
    pub data: AnalysisResult,
    /// Failure kind
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorKind>,
    /// Failure detail
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ServiceResult {
    /// Wrap a successful analysis
    pub fn success(data: AnalysisResult) -> Self {
        Self {
            success: true,
            data,
            error: None,
            message: None,
        }
    }

    /// Build a failed envelope with a synthesized placeholder result
    pub fn failure(kind: ErrorKind, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            success: false,
            data: AnalysisResult::error(kind, &message),
            error: Some(kind),
            message: Some(message),
        }
    }

    /// Error kind, if this envelope reports a failure
    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error
    }
}

/// Static descriptor of the detection service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInfo {
    /// Service display name
    pub name: String,
    /// Service version
    pub version: String,
    /// Supported capabilities
    pub capabilities: Vec<String>,
}

/// Format a unit-range score as a percentage with one decimal place
pub fn format_percentage(score: f64) -> String {
    format!("{:.1}%", clamp_unit(score) * 100.0)
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
