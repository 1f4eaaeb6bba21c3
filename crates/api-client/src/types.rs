// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Input and request types shared by the service and the provider clients

use std::{fmt, io, path::Path};

use tokio::fs;

/// MIME type reported for files whose extension is not a known image type
pub const UNKNOWN_MIME_TYPE: &str = "application/octet-stream";

/// A binary image payload with its declared MIME type
#[derive(Clone, PartialEq, Eq)]
pub struct ImageFile {
    name: String,
    mime_type: String,
    bytes: Vec<u8>,
}

impl ImageFile {
    /// Create an image file from raw parts
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Read an image from disk, inferring the MIME type from the extension
    pub async fn from_path(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).await?;
        let name = path
            .file_name()
            .map_or_else(|| "image".to_string(), |n| n.to_string_lossy().into_owned());
        let mime_type = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map_or(UNKNOWN_MIME_TYPE, mime_type_for_extension);

        Ok(Self::new(name, mime_type, bytes))
    }

    /// File name sent alongside the payload
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared MIME type
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Raw content
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Payload length in bytes
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Replace the declared MIME type
    #[must_use]
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }

    /// Split into `(name, mime_type, bytes)`
    pub fn into_parts(self) -> (String, String, Vec<u8>) {
        (self.name, self.mime_type, self.bytes)
    }
}

impl fmt::Debug for ImageFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageFile")
            .field("name", &self.name)
            .field("mime_type", &self.mime_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// Map a file extension to an image MIME type
pub fn mime_type_for_extension(extension: &str) -> &'static str {
    match extension.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" | "jfif" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "heic" => "image/heic",
        "avif" => "image/avif",
        "svg" => "image/svg+xml",
        _ => UNKNOWN_MIME_TYPE,
    }
}

/// What the caller asked to analyze
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisInput {
    /// An uploaded image
    File(ImageFile),
    /// A remote image the provider fetches itself
    Url(String),
}

impl AnalysisInput {
    /// Short label for logging
    pub fn source(&self) -> &'static str {
        match self {
            AnalysisInput::File(_) => "file",
            AnalysisInput::Url(_) => "url",
        }
    }
}

/// Body of a provider request
#[derive(Clone, PartialEq, Eq)]
pub enum RequestBody {
    /// Binary upload
    Media {
        /// File name for the multipart part
        file_name: String,
        /// Declared MIME type
        mime_type: String,
        /// Raw content
        bytes: Vec<u8>,
    },
    /// Reference to a remote image
    Url {
        /// Remote location
        url: String,
    },
}

impl fmt::Debug for RequestBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestBody::Media {
                file_name,
                mime_type,
                bytes,
            } => f
                .debug_struct("Media")
                .field("file_name", file_name)
                .field("mime_type", mime_type)
                .field("size", &bytes.len())
                .finish(),
            RequestBody::Url { url } => f.debug_struct("Url").field("url", url).finish(),
        }
    }
}

/// A fully prepared request, independent of the transport
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderRequest {
    /// Value of the `Authorization` header
    pub authorization: String,
    /// Payload
    pub body: RequestBody,
}

impl fmt::Debug for ProviderRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderRequest")
            .field("authorization", &"<redacted>")
            .field("body", &self.body)
            .finish()
    }
}
