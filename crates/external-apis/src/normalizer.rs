// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Hive response normalization
//!
//! Hive answers with a deeply nested envelope:
//!
//! ```json
//! {"status": [{"status": {"code": "0", "message": "SUCCESS"},
//!              "response": {"output": [{"classes": [
//!                  {"class": "ai_generated", "score": 0.97},
//!                  {"class": "not_ai_generated", "score": 0.03},
//!                  {"class": "midjourney", "score": 0.91}]}]}}]}
//! ```
//!
//! The body is treated as a loosely-typed tree and every level is optional.
//! [`normalize`] never fails: a missing or malformed class list yields a
//! zero-confidence result with an explanatory detail line.

use serde_json::Value;
use shared_types::{AnalysisResult, GeneratorScore, format_percentage};
use tracing::{debug, warn};

use crate::generators::display_name;

/// Backend identifier reported in successful results
pub const HIVE_MODEL: &str = "Hive AI";

/// Confidence at or above which an image is reported as AI-generated
pub const DECISION_THRESHOLD: f64 = 0.5;

/// Generator scores at or below this value are left out of the breakdown
pub const NOISE_FLOOR: f64 = 0.01;

const AI_CLASS: &str = "ai_generated";
const NOT_AI_CLASS: &str = "not_ai_generated";
const IGNORED_CLASSES: &[&str] = &["none", "inconclusive"];

const NO_OUTPUT_DETAIL: &str =
    "The detection service returned no classification output for this image";
const NO_VERDICT_DETAIL: &str =
    "The detection service returned no AI-generation verdict; reporting 0% AI likelihood";
const NO_GENERATOR_DETAIL: &str = "No specific generator signature identified";

static NULL: Value = Value::Null;

/// Where the confidence came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VerdictSource {
    /// The `ai_generated` class score
    AiClass,
    /// One minus the `not_ai_generated` class score
    Complement,
    /// Neither class was present
    Missing,
}

/// Map a raw Hive body into a normalized analysis result
pub fn normalize(raw: &Value) -> AnalysisResult {
    let scores = locate_classes(raw)
        .map(|classes| parse_scores(classes))
        .unwrap_or_default();

    if scores.is_empty() {
        warn!("provider response contained no usable classification output");
        return AnalysisResult::new(
            0.0,
            false,
            HIVE_MODEL,
            vec![NO_OUTPUT_DETAIL.to_string()],
            Vec::new(),
        );
    }

    let (confidence, source) = verdict(&scores);
    if source == VerdictSource::Missing {
        // Reviewed default: no verdict class means no positive AI signal.
        warn!(
            classes = scores.len(),
            "provider response has neither ai_generated nor not_ai_generated class"
        );
    }

    let is_ai_generated = source != VerdictSource::Missing && confidence >= DECISION_THRESHOLD;
    let generators = generator_breakdown(&scores);

    let mut details = Vec::with_capacity(generators.len() + 2);
    details.push(summary_line(confidence, is_ai_generated, source));
    details.extend(
        generators
            .iter()
            .map(|g| format!("{}: {}", g.name, g.percentage())),
    );
    if is_ai_generated && generators.is_empty() {
        details.push(NO_GENERATOR_DETAIL.to_string());
    }

    debug!(
        confidence,
        is_ai_generated,
        generators = generators.len(),
        "normalized provider response"
    );

    AnalysisResult::new(
        confidence,
        is_ai_generated,
        HIVE_MODEL,
        details,
        generators,
    )
}

/// Locate the classification list inside a Hive body
///
/// Accepts `status` as either a list of task entries or a single entry, and
/// tolerates bodies that start directly at `response` or `output`.
pub fn locate_classes(raw: &Value) -> Option<&Vec<Value>> {
    let task = raw.get("status").map_or(raw, first_entry);
    let response = task.get("response").unwrap_or(task);
    let output = first_entry(response.get("output")?);
    output.get("classes")?.as_array()
}

/// First element of an array, or the value itself when it is not an array
pub(crate) fn first_entry(value: &Value) -> &Value {
    match value {
        Value::Array(items) => items.first().unwrap_or(&NULL),
        other => other,
    }
}

fn parse_scores(classes: &[Value]) -> Vec<(String, f64)> {
    classes
        .iter()
        .filter_map(|entry| {
            let name = entry
                .get("class")
                .or_else(|| entry.get("name"))
                .and_then(Value::as_str)?
                .trim();
            let score = entry.get("score").and_then(score_value)?;
            (!name.is_empty()).then(|| (name.to_lowercase(), score))
        })
        .collect()
}

fn score_value(value: &Value) -> Option<f64> {
    let score = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    score.is_finite().then(|| score.clamp(0.0, 1.0))
}

fn class_score(scores: &[(String, f64)], class: &str) -> Option<f64> {
    scores
        .iter()
        .find(|(name, _)| name == class)
        .map(|(_, score)| *score)
}

fn verdict(scores: &[(String, f64)]) -> (f64, VerdictSource) {
    if let Some(score) = class_score(scores, AI_CLASS) {
        (score, VerdictSource::AiClass)
    } else if let Some(score) = class_score(scores, NOT_AI_CLASS) {
        (1.0 - score, VerdictSource::Complement)
    } else {
        (0.0, VerdictSource::Missing)
    }
}

fn generator_breakdown(scores: &[(String, f64)]) -> Vec<GeneratorScore> {
    let mut generators: Vec<GeneratorScore> = Vec::new();

    for (slug, score) in scores {
        if slug == AI_CLASS || slug == NOT_AI_CLASS || IGNORED_CLASSES.contains(&slug.as_str()) {
            continue;
        }
        if *score <= NOISE_FLOOR {
            continue;
        }

        let name = display_name(slug);
        match generators.iter_mut().find(|g| g.name == name) {
            Some(existing) => existing.score = existing.score.max(*score),
            None => generators.push(GeneratorScore::new(name, *score)),
        }
    }

    generators.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.name.cmp(&b.name)));
    generators
}

fn summary_line(confidence: f64, is_ai_generated: bool, source: VerdictSource) -> String {
    let percentage = format_percentage(confidence);
    match source {
        VerdictSource::Missing => NO_VERDICT_DETAIL.to_string(),
        _ if is_ai_generated => format!("Likely AI-generated ({percentage} confidence)"),
        _ => format!("Likely not AI-generated ({percentage} AI likelihood)"),
    }
}
