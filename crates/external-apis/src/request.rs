// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Provider request construction

use api_client::{AnalysisInput, ApiKey, ProviderRequest, RequestBody};

/// Authorization scheme expected by the Hive task API
pub const AUTH_SCHEME: &str = "Token";

/// Convert a validated input and an active credential into a provider request
///
/// File inputs become a binary media upload carrying their declared MIME type;
/// URL inputs are forwarded verbatim for the provider to fetch.
pub fn build_request(input: AnalysisInput, api_key: &ApiKey) -> ProviderRequest {
    let body = match input {
        AnalysisInput::File(file) => {
            let (file_name, mime_type, bytes) = file.into_parts();
            RequestBody::Media {
                file_name,
                mime_type,
                bytes,
            }
        }
        AnalysisInput::Url(url) => RequestBody::Url {
            url: url.trim().to_string(),
        },
    };

    ProviderRequest {
        authorization: format!("{AUTH_SCHEME} {}", api_key.expose()),
        body,
    }
}
