use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::error::{Result, ThumbnailError};

/// An inline `data:<mime>;base64,<payload>` image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
    pub mime_type: String,
    pub payload: String,
}

impl DataUri {
    pub fn new(mime_type: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            payload: payload.into(),
        }
    }

    pub fn from_bytes(mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self::new(mime_type, STANDARD.encode(bytes))
    }

    pub fn parse(uri: &str) -> Result<Self> {
        let rest = uri
            .strip_prefix("data:")
            .ok_or_else(|| ThumbnailError::InvalidInput("Image must be a data URI".into()))?;
        let (header, payload) = rest.split_once(',').ok_or_else(|| {
            ThumbnailError::InvalidInput("Data URI is missing its payload".into())
        })?;
        let mime_type = header.strip_suffix(";base64").ok_or_else(|| {
            ThumbnailError::InvalidInput("Data URI must use base64 encoding".into())
        })?;
        if mime_type.is_empty() {
            return Err(ThumbnailError::InvalidInput(
                "Data URI must include a MIME type".into(),
            ));
        }

        Ok(Self::new(mime_type, payload))
    }

    pub fn decode(&self) -> Result<Vec<u8>> {
        STANDARD
            .decode(self.payload.as_bytes())
            .map_err(|e| ThumbnailError::ResponseError(format!("Invalid base64 image data: {}", e)))
    }

    pub fn extension(&self) -> &'static str {
        match self.mime_type.as_str() {
            "image/jpeg" | "image/jpg" => "jpg",
            "image/webp" => "webp",
            "image/gif" => "gif",
            _ => "png",
        }
    }
}

impl fmt::Display for DataUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "data:{};base64,{}", self.mime_type, self.payload)
    }
}

/// Best-effort MIME type from a file extension, for reading reference images off disk.
pub fn mime_from_path(path: &std::path::Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "image/png",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mime_and_payload() {
        let uri = DataUri::parse("data:image/jpeg;base64,/9j/4AAQ").unwrap();
        assert_eq!(uri.mime_type, "image/jpeg");
        assert_eq!(uri.payload, "/9j/4AAQ");
        assert_eq!(uri.extension(), "jpg");
        assert_eq!(uri.to_string(), "data:image/jpeg;base64,/9j/4AAQ");
    }

    #[test]
    fn rejects_non_base64_uris() {
        assert!(DataUri::parse("https://example.com/a.png").is_err());
        assert!(DataUri::parse("data:image/png,rawbytes").is_err());
        assert!(DataUri::parse("data:;base64,AAAA").is_err());
    }

    #[test]
    fn decodes_payload_bytes() {
        let uri = DataUri::from_bytes("image/png", b"\x89PNG");
        assert_eq!(uri.decode().unwrap(), b"\x89PNG");
    }

    #[test]
    fn mime_follows_file_extension() {
        assert_eq!(mime_from_path(std::path::Path::new("me.JPG")), "image/jpeg");
        assert_eq!(mime_from_path(std::path::Path::new("me")), "image/png");
    }
}
