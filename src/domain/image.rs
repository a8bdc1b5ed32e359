// ============================================================
// Layer 3 - Image Domain Types
// ============================================================
// An UploadedImage is exactly what the browser sent: a file
// name, an optional declared media type and the raw bytes.
// It lives for one request only.
//
// An EncodedImage is the base64 text of those bytes plus the
// resolved media type. It can be dropped straight into a CSS
// `url('data:...')` so the page never fetches image content
// over the network.
//
// Reference: base64 crate documentation (Engine API)

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::Serialize;
use std::{fmt, sync::Arc};

/// Media types the slideshow knows about.
/// Only PNG and JPEG may be uploaded; SVG is reserved for the
/// built-in fallback background and start-up fallback files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MediaType {
    Png,
    Jpeg,
    Svg,
}

impl MediaType {
    /// Parse a declared MIME type such as `image/png; charset=binary`.
    /// Parameters after `;` and letter case are ignored.
    pub fn from_declared(declared: &str) -> Option<Self> {
        let essence = declared
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase();

        match essence.as_str() {
            "image/png"                              => Some(Self::Png),
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Some(Self::Jpeg),
            "image/svg+xml"                          => Some(Self::Svg),
            _                                        => None,
        }
    }

    /// Guess the media type from a file name's extension.
    pub fn from_extension(file_name: &str) -> Option<Self> {
        let (_, ext) = file_name.rsplit_once('.')?;
        match ext.to_ascii_lowercase().as_str() {
            "png"          => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "svg"          => Some(Self::Svg),
            _              => None,
        }
    }

    /// The canonical MIME string used in data URLs
    pub fn mime(&self) -> &'static str {
        match self {
            Self::Png  => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Svg  => "image/svg+xml",
        }
    }

    /// Whether users may upload this type for the slideshow
    pub fn is_uploadable(&self) -> bool {
        matches!(self, Self::Png | Self::Jpeg)
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime())
    }
}

/// Raw image content as received from the uploader widget.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    /// Client-side file name, kept so rejections can name the file
    pub file_name: String,

    /// The Content-Type the client declared, if any
    pub declared_type: Option<String>,

    /// The file content
    pub bytes: Vec<u8>,
}

impl UploadedImage {
    pub fn new(
        file_name:     impl Into<String>,
        declared_type: Option<String>,
        bytes:         Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            declared_type,
            bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Text-safe, embeddable form of an image.
/// Clones share the encoded payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub file_name:  String,
    pub media_type: MediaType,
    /// Standard-alphabet base64 of the uploaded bytes
    pub base64:     Arc<str>,
}

impl EncodedImage {
    /// Encode raw bytes. Deterministic: the same input always
    /// produces the same text.
    pub fn encode(file_name: impl Into<String>, media_type: MediaType, bytes: &[u8]) -> Self {
        Self {
            file_name: file_name.into(),
            media_type,
            base64:    BASE64.encode(bytes).into(),
        }
    }

    /// `data:<mime>;base64,<payload>`
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type.mime(), self.base64)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declared_type_ignores_case_and_parameters() {
        assert_eq!(MediaType::from_declared("IMAGE/PNG"), Some(MediaType::Png));
        assert_eq!(MediaType::from_declared("image/jpeg; q=1"), Some(MediaType::Jpeg));
        assert_eq!(MediaType::from_declared("image/jpg"), Some(MediaType::Jpeg));
        assert_eq!(MediaType::from_declared("image/gif"), None);
    }

    #[test]
    fn test_extension_lookup() {
        assert_eq!(MediaType::from_extension("beach.JPEG"), Some(MediaType::Jpeg));
        assert_eq!(MediaType::from_extension("house.png"), Some(MediaType::Png));
        assert_eq!(MediaType::from_extension("notes.txt"), None);
        assert_eq!(MediaType::from_extension("no_extension"), None);
    }

    #[test]
    fn test_svg_is_not_uploadable() {
        assert!(MediaType::Png.is_uploadable());
        assert!(MediaType::Jpeg.is_uploadable());
        assert!(!MediaType::Svg.is_uploadable());
    }

    #[test]
    fn test_data_url_shape() {
        let img = EncodedImage::encode("a.png", MediaType::Png, b"hello");
        assert_eq!(&*img.base64, "aGVsbG8=");
        assert_eq!(img.data_url(), "data:image/png;base64,aGVsbG8=");
    }
}
