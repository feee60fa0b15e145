//! Encoded image sources.
//!
//! An [`ImageSource`] is the original, still-encoded file: raster renders
//! decode it, vector renders embed it as a `data:` URI.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use super::DecodeError;

const FALLBACK_MIME: &str = "application/octet-stream";

/// The encoded bytes of one loaded image plus its MIME type.
///
/// Cloning is cheap; the bytes are shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSource {
    mime_type: String,
    bytes: Arc<[u8]>,
}

impl ImageSource {
    /// Wrap raw file bytes, sniffing the MIME type from the content.
    pub fn from_bytes(bytes: impl Into<Arc<[u8]>>) -> Self {
        let bytes = bytes.into();
        let mime_type = image::guess_format(&bytes)
            .map(|f| f.to_mime_type().to_string())
            .unwrap_or_else(|_| FALLBACK_MIME.to_string());
        Self { mime_type, bytes }
    }

    /// Parse a base64 `data:<mime>;base64,<payload>` URI.
    ///
    /// # Errors
    ///
    /// Returns `DecodeError::InvalidDataUri` when the scheme, the base64
    /// marker or the payload is malformed.
    pub fn from_data_uri(uri: &str) -> Result<Self, DecodeError> {
        let rest = uri
            .trim()
            .strip_prefix("data:")
            .ok_or_else(|| DecodeError::InvalidDataUri("missing data: scheme".to_string()))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| DecodeError::InvalidDataUri("missing comma".to_string()))?;
        let mime = header
            .strip_suffix(";base64")
            .ok_or_else(|| DecodeError::InvalidDataUri("payload is not base64".to_string()))?;

        let bytes = STANDARD
            .decode(payload.trim())
            .map_err(|e| DecodeError::InvalidDataUri(e.to_string()))?;

        // Parameters such as ";charset=..." are dropped from the stored type
        let mime = mime.split(';').next().unwrap_or_default();
        let mime_type = if mime.is_empty() {
            FALLBACK_MIME.to_string()
        } else {
            mime.to_string()
        };

        Ok(Self {
            mime_type,
            bytes: bytes.into(),
        })
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Whether the MIME type is `image/*`. Other uploads are ignored.
    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }

    /// Render back to a base64 `data:` URI for embedding.
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.bytes))
    }
}

/// Display name for an uploaded file: the file name without its final extension.
///
/// Dotfiles, trailing dots and names without an extension are returned unchanged.
pub fn display_name(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(dot) if dot > 0 && dot + 1 < file_name.len() && !file_name[dot..].contains('/') => {
            &file_name[..dot]
        }
        _ => file_name,
    }
}
