//! Inline photo encoding.
//!
//! Photos never leave the report record: they are carried as
//! `data:<mimetype>;base64,<payload>` strings from the browser to the
//! database, and forwarded as-is to the analysis service.

use base64::prelude::*;
use thiserror::Error;

use crate::shared::constants::{ALLOWED_PHOTO_MIME_TYPES, MAX_PHOTO_SIZE};
use crate::shared::validation::MIME_TYPE_REGEX;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DataUriError {
    #[error("must start with 'data:'")]
    MissingScheme,

    #[error("must be base64 encoded")]
    NotBase64,

    #[error("invalid MIME type '{0}'")]
    InvalidMimeType(String),

    #[error("file type '{0}' is not an accepted image type")]
    UnsupportedMimeType(String),

    #[error("payload is not valid base64")]
    InvalidPayload,

    #[error("payload is empty")]
    Empty,

    #[error("photo is larger than {max} bytes")]
    TooLarge { max: usize },
}

/// A parsed, validated photo data URI. Borrowed from the request payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoDataUri<'a> {
    pub mime_type: &'a str,
    /// Base64 payload exactly as received
    pub payload: &'a str,
}

impl<'a> PhotoDataUri<'a> {
    pub fn parse(raw: &'a str) -> Result<Self, DataUriError> {
        let rest = raw
            .trim()
            .strip_prefix("data:")
            .ok_or(DataUriError::MissingScheme)?;
        let (mime_type, payload) = rest
            .split_once(";base64,")
            .ok_or(DataUriError::NotBase64)?;

        if !MIME_TYPE_REGEX.is_match(mime_type) {
            return Err(DataUriError::InvalidMimeType(mime_type.to_string()));
        }
        if !ALLOWED_PHOTO_MIME_TYPES.contains(&mime_type.to_ascii_lowercase().as_str()) {
            return Err(DataUriError::UnsupportedMimeType(mime_type.to_string()));
        }
        if payload.is_empty() {
            return Err(DataUriError::Empty);
        }

        // base64 inflates by 4/3, reject before decoding anything huge
        if payload.len() / 4 * 3 > MAX_PHOTO_SIZE + 3 {
            return Err(DataUriError::TooLarge { max: MAX_PHOTO_SIZE });
        }

        let decoded = BASE64_STANDARD
            .decode(payload)
            .map_err(|_| DataUriError::InvalidPayload)?;
        if decoded.is_empty() {
            return Err(DataUriError::Empty);
        }
        if decoded.len() > MAX_PHOTO_SIZE {
            return Err(DataUriError::TooLarge { max: MAX_PHOTO_SIZE });
        }

        Ok(Self { mime_type, payload })
    }

    /// Raw image bytes
    pub fn decode(&self) -> Result<Vec<u8>, DataUriError> {
        BASE64_STANDARD
            .decode(self.payload)
            .map_err(|_| DataUriError::InvalidPayload)
    }
}

/// Encode raw file bytes into a data URI.
pub fn encode(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, BASE64_STANDARD.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    // 1x1 transparent PNG
    const PNG_1X1: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

    #[test]
    fn test_parse_valid_png() {
        let raw = format!("data:image/png;base64,{}", PNG_1X1);
        let parsed = PhotoDataUri::parse(&raw).unwrap();
        assert_eq!(parsed.mime_type, "image/png");
        assert_eq!(parsed.payload, PNG_1X1);
        assert_eq!(parsed.decode().unwrap(), BASE64_STANDARD.decode(PNG_1X1).unwrap());
    }

    #[test]
    fn test_parse_rejects_plain_url() {
        assert_eq!(
            PhotoDataUri::parse("https://example.com/cat.png"),
            Err(DataUriError::MissingScheme)
        );
    }

    #[test]
    fn test_parse_rejects_non_base64_data_uri() {
        assert_eq!(
            PhotoDataUri::parse("data:image/png,rawbytes"),
            Err(DataUriError::NotBase64)
        );
    }

    #[test]
    fn test_parse_rejects_non_image() {
        let raw = format!("data:application/pdf;base64,{}", PNG_1X1);
        assert!(matches!(
            PhotoDataUri::parse(&raw),
            Err(DataUriError::UnsupportedMimeType(_))
        ));
    }

    #[test]
    fn test_parse_rejects_corrupt_payload() {
        assert_eq!(
            PhotoDataUri::parse("data:image/png;base64,@@@not-base64@@@"),
            Err(DataUriError::InvalidPayload)
        );
        assert_eq!(
            PhotoDataUri::parse("data:image/png;base64,"),
            Err(DataUriError::Empty)
        );
    }

    #[test]
    fn test_parse_rejects_oversized_photo() {
        let big = vec![0u8; MAX_PHOTO_SIZE + 1];
        let raw = encode("image/jpeg", &big);
        assert_eq!(
            PhotoDataUri::parse(&raw),
            Err(DataUriError::TooLarge { max: MAX_PHOTO_SIZE })
        );
    }

    #[test]
    fn test_encode_produces_parseable_uri() {
        let raw = encode("image/jpeg", b"\xff\xd8\xff\xe0fake-jpeg");
        assert!(raw.starts_with("data:image/jpeg;base64,"));
        assert!(PhotoDataUri::parse(&raw).is_ok());
    }
}
