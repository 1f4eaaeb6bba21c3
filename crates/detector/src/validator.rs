// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Pre-dispatch input checks
//!
//! Rules run in a fixed order and the first failure wins: the MIME type must
//! be accepted, then the payload must fit under the size ceiling.

use api_client::ImageFile;
use tracing::debug;

use crate::{
    config::DetectorConfig,
    error::{DetectorError, DetectorResult},
};

/// Checks image uploads against the accepted types and the size ceiling
#[derive(Debug, Clone)]
pub struct RequestValidator {
    accepted_mime_types: Vec<String>,
    max_file_size_bytes: u64,
}

impl RequestValidator {
    /// Create a validator with explicit limits
    pub fn new<I, S>(accepted_mime_types: I, max_file_size_bytes: u64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let accepted_mime_types = accepted_mime_types
            .into_iter()
            .map(|m| normalize_mime_type(m.as_ref()))
            .filter(|m| !m.is_empty())
            .collect();

        Self {
            accepted_mime_types,
            max_file_size_bytes,
        }
    }

    /// Create a validator from service configuration
    pub fn from_config(config: &DetectorConfig) -> Self {
        Self::new(&config.accepted_mime_types, config.max_file_size_bytes)
    }

    /// Accepted MIME types, normalized
    pub fn accepted_mime_types(&self) -> &[String] {
        &self.accepted_mime_types
    }

    /// Size ceiling in bytes
    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_bytes
    }

    /// Check whether a MIME type is accepted
    pub fn accepts(&self, mime_type: &str) -> bool {
        let mime_type = normalize_mime_type(mime_type);
        self.accepted_mime_types.contains(&mime_type)
    }

    /// Validate an image upload, returning its canonical MIME type
    ///
    /// The canonical form is what the provider should receive: lowercased,
    /// without parameters or padding, and with aliases folded.
    ///
    /// # Errors
    ///
    /// Returns `InvalidFileType` for an unaccepted MIME type, otherwise
    /// `FileTooLarge` when the payload exceeds the ceiling
    pub fn validate(&self, file: &ImageFile) -> DetectorResult<String> {
        let mime_type = normalize_mime_type(file.mime_type());
        if !self.accepted_mime_types.contains(&mime_type) {
            return Err(DetectorError::InvalidFileType {
                mime_type: file.mime_type().to_string(),
                accepted: self.accepted_mime_types.clone(),
            });
        }

        if file.size() > self.max_file_size_bytes {
            return Err(DetectorError::FileTooLarge {
                size_bytes: file.size(),
                max_bytes: self.max_file_size_bytes,
            });
        }

        debug!(
            mime_type = mime_type.as_str(),
            size_bytes = file.size(),
            "image passed validation"
        );
        Ok(mime_type)
    }
}

/// Lowercase, drop parameters, and fold the `image/jpg` alias
fn normalize_mime_type(mime_type: &str) -> String {
    let essence = mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    match essence.as_str() {
        "image/jpg" | "image/pjpeg" => "image/jpeg".to_string(),
        _ => essence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> RequestValidator {
        RequestValidator::from_config(&DetectorConfig::for_testing())
    }

    fn image(mime_type: &str, size: usize) -> ImageFile {
        ImageFile::new("upload", mime_type, vec![0; size])
    }

    #[test]
    fn accepts_supported_types_up_to_the_ceiling() {
        let validator = RequestValidator::new(["image/png", "image/jpeg"], 64);

        assert!(validator.validate(&image("image/png", 64)).is_ok());
        assert!(validator.validate(&image("image/jpeg", 0)).is_ok());
    }

    #[test]
    fn rejects_unsupported_types() {
        let validator = validator();

        for mime_type in ["text/plain", "application/pdf", "image/bmp", "", "image"] {
            let error = validator.validate(&image(mime_type, 10)).unwrap_err();
            assert!(
                matches!(error, DetectorError::InvalidFileType { .. }),
                "{mime_type}: {error}"
            );
        }
    }

    #[test]
    fn rejects_oversized_payloads() {
        let validator = RequestValidator::new(["image/png"], 100);

        let error = validator.validate(&image("image/png", 101)).unwrap_err();
        match error {
            DetectorError::FileTooLarge {
                size_bytes,
                max_bytes,
            } => {
                assert_eq!(size_bytes, 101);
                assert_eq!(max_bytes, 100);
            }
            other => panic!("Expected FileTooLarge error, got: {other:?}"),
        }
    }

    #[test]
    fn type_check_runs_before_size_check() {
        let validator = RequestValidator::new(["image/png"], 1);

        let error = validator.validate(&image("text/html", 1000)).unwrap_err();
        assert!(matches!(error, DetectorError::InvalidFileType { .. }));
    }

    #[test]
    fn mime_types_are_normalized() {
        let validator = validator();

        assert!(validator.accepts("IMAGE/PNG"));
        assert!(validator.accepts("image/jpg"));
        assert!(validator.accepts("image/webp; charset=binary"));
        assert!(validator.accepts(" image/gif "));
        assert!(!validator.accepts("image/svg+xml"));
    }

    #[test]
    fn validation_yields_the_canonical_type() {
        let validator = validator();

        for (declared, canonical) in [
            (" image/gif ", "image/gif"),
            ("IMAGE/PNG", "image/png"),
            ("image/webp; charset=binary", "image/webp"),
            ("image/jpg", "image/jpeg"),
            ("image/pjpeg", "image/jpeg"),
        ] {
            assert_eq!(validator.validate(&image(declared, 10)).unwrap(), canonical);
        }
    }

    #[test]
    fn default_limits() {
        let validator = validator();
        assert_eq!(validator.max_file_size_bytes(), 10 * 1024 * 1024);
        assert_eq!(
            validator.accepted_mime_types(),
            ["image/jpeg", "image/png", "image/gif", "image/webp"]
        );
    }
}
