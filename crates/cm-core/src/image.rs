//! Uploaded source image.

use bytes::Bytes;

/// An image picked by the user for ingredient recognition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl SourceImage {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Guess the MIME type from the file extension.
    pub fn content_type_for(file_name: &str) -> &'static str {
        let ext = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "jpg" | "jpeg" => "image/jpeg",
            "png" => "image/png",
            "webp" => "image/webp",
            _ => "application/octet-stream",
        }
    }

    /// Content hash identifying this image, independent of its file name.
    pub fn fingerprint(&self) -> ImageFingerprint {
        ImageFingerprint(blake3::hash(&self.bytes).to_hex().to_string())
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageFingerprint(String);

impl ImageFingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
