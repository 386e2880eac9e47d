//! Inline image attachments for vision requests

use crate::llm::ContentBlock;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use thiserror::Error;

const FALLBACK_MEDIA_TYPE: &str = "image/jpeg";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ImageError {
    #[error("image payload is empty")]
    Empty,
    #[error("image data URL is not base64 encoded")]
    NotBase64DataUrl,
    #[error("image payload is not valid base64: {0}")]
    InvalidBase64(String),
}

/// A validated base64 image ready to embed in a model request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    pub media_type: String,
    /// Base64 payload with whitespace removed
    pub data: String,
}

impl ImageAttachment {
    /// Accepts either a bare base64 string or a `data:<type>;base64,<payload>` URL.
    ///
    /// The media type comes from the data URL when present, otherwise it is
    /// sniffed from the decoded bytes, defaulting to JPEG.
    pub fn decode(raw: &str) -> Result<Self, ImageError> {
        let raw = raw.trim();
        let (declared, payload) = match raw.strip_prefix("data:") {
            Some(rest) => {
                let (header, payload) = rest.split_once(',').ok_or(ImageError::NotBase64DataUrl)?;
                let media_type = header
                    .strip_suffix(";base64")
                    .ok_or(ImageError::NotBase64DataUrl)?;
                (Some(media_type), payload)
            }
            None => (None, raw),
        };

        let data: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
        if data.is_empty() {
            return Err(ImageError::Empty);
        }

        let bytes = STANDARD
            .decode(&data)
            .map_err(|e| ImageError::InvalidBase64(e.to_string()))?;

        let media_type = declared
            .filter(|m| m.starts_with("image/"))
            .or_else(|| sniff_media_type(&bytes))
            .unwrap_or(FALLBACK_MEDIA_TYPE)
            .to_string();

        Ok(Self { media_type, data })
    }

    pub fn to_content_block(&self) -> ContentBlock {
        ContentBlock::image(self.media_type.clone(), self.data.clone())
    }
}

fn sniff_media_type(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        Some("image/png")
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("image/jpeg")
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        Some("image/gif")
    } else if bytes.len() >= 12 && bytes.starts_with(b"RIFF") && bytes.get(8..12) == Some(b"WEBP".as_slice()) {
        Some("image/webp")
    } else {
        None
    }
}
