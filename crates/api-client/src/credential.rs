// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Provider credentials
//!
//! [`ApiKey`] holds a provider token that is guaranteed to contain at least
//! one non-whitespace character. Surrounding whitespace (common when a key is
//! pasted into a settings field) is stripped on construction.
//!
//! The token is never printed by `Debug`, so keys can travel inside structs
//! that are logged with `tracing`.
//!
//! ```rust
//! use api_client::ApiKey;
//!
//! let key = ApiKey::new("  hive-secret-token \n").unwrap();
//! assert_eq!(key.expose(), "hive-secret-token");
//! assert!(!format!("{key:?}").contains("secret"));
//!
//! assert!(ApiKey::new("").is_err());
//! assert!(ApiKey::new("   ").is_err());
//! ```

use core::fmt;
use std::str::FromStr;

/// A non-empty, trimmed provider token
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(Box<str>);

impl ApiKey {
    /// Create a new `ApiKey` from any string-like input
    ///
    /// # Returns
    ///
    /// * `Ok(ApiKey)` holding the trimmed token
    /// * `Err(String)` if the input is empty or whitespace-only
    pub fn new(token: impl Into<String>) -> Result<Self, String> {
        let token = token.into();
        let trimmed = token.trim();
        if trimmed.is_empty() {
            Err("API key cannot be empty or whitespace-only".to_string())
        } else {
            Ok(Self(Box::from(trimmed)))
        }
    }

    /// Create an `ApiKey` if the input holds a usable token
    pub fn parse_optional(token: Option<&str>) -> Option<Self> {
        token.and_then(|t| Self::new(t).ok())
    }

    /// Get the raw token for placing in a request
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

impl FromStr for ApiKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_surrounding_whitespace() {
        let key = ApiKey::new("\tabc123 ").unwrap();
        assert_eq!(key.expose(), "abc123");
    }

    #[test]
    fn rejects_blank_tokens() {
        assert!(ApiKey::new("").is_err());
        assert!(ApiKey::new(" \n\t ").is_err());
        assert!("".parse::<ApiKey>().is_err());
    }

    #[test]
    fn debug_is_redacted() {
        let key = ApiKey::new("super-secret").unwrap();
        let debug = format!("{key:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("redacted"));
    }

    #[test]
    fn parse_optional_skips_blank_values() {
        assert!(ApiKey::parse_optional(None).is_none());
        assert!(ApiKey::parse_optional(Some("  ")).is_none());
        assert_eq!(
            ApiKey::parse_optional(Some("k")).map(|k| k.expose().to_string()),
            Some("k".to_string())
        );
    }
}
