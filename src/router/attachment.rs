//! Image Attachments
//!
//! Uploaded images and their data-URI rendering.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;

/// An uploaded image held in memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    /// MIME type as reported by the client, e.g. `image/png`
    pub mime_type: String,

    /// Raw image bytes
    pub data: Bytes,
}

impl ImageAttachment {
    pub fn new(mime_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    /// Whether a MIME type is accepted for upload
    pub fn is_image_mime(mime_type: &str) -> bool {
        mime_type
            .get(..6)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case("image/"))
    }

    /// `data:<mime>;base64,<payload>`
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.data))
    }
}
