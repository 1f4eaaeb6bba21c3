// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Canned Hive task responses and mock setups

use serde_json::{Value, json};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{header, method, path},
};

use super::{TASK_PATH, TEST_API_KEY};

/// Wrap a class list in the Hive task envelope
pub fn hive_body(classes: Value) -> Value {
    json!({
        "id": "task-1",
        "code": 200,
        "status": [{
            "status": {"code": "0", "message": "SUCCESS"},
            "response": {"output": [{"time": 0, "classes": classes}]}
        }]
    })
}

/// Body reporting an AI verdict with one dominant generator
pub fn ai_generated_body() -> Value {
    hive_body(json!([
        {"class": "ai_generated", "score": 0.85},
        {"class": "not_ai_generated", "score": 0.15},
        {"class": "midjourney", "score": 0.72},
        {"class": "dalle", "score": 0.09},
        {"class": "stablediffusion", "score": 0.004}
    ]))
}

/// Body carrying only the complement class
pub fn not_ai_generated_body() -> Value {
    hive_body(json!([{"class": "not_ai_generated", "score": 0.8}]))
}

/// Mount a response for authenticated POSTs to the task endpoint
pub async fn mount_task(mock_server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path(TASK_PATH))
        .and(header("authorization", format!("Token {TEST_API_KEY}").as_str()))
        .respond_with(response)
        .mount(mock_server)
        .await;
}

/// Mount a mock that fails verification if the provider is ever called
pub async fn mount_no_calls(mock_server: &MockServer) {
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ai_generated_body()))
        .expect(0)
        .mount(mock_server)
        .await;
}
