use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

use crate::shared::constants::DESCRIPTION_MIN_CHARS;
use crate::shared::data_uri::PhotoDataUri;

lazy_static! {
    /// Regex for the MIME type segment of a data URI
    /// - Valid: "image/png", "image/svg+xml", "image/vnd.microsoft.icon"
    /// - Invalid: "image", "image/", "/png", "image png"
    pub static ref MIME_TYPE_REGEX: Regex =
        Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9!#$&^_.+-]*/[a-zA-Z0-9][a-zA-Z0-9!#$&^_.+-]*$").unwrap();
}

/// Description must carry at least `DESCRIPTION_MIN_CHARS` characters
/// once surrounding whitespace is ignored.
pub fn validate_description(description: &str) -> Result<(), ValidationError> {
    if (description.trim().chars().count() as u64) < DESCRIPTION_MIN_CHARS {
        let mut err = ValidationError::new("description_too_short");
        err.message = Some("A descrição deve ter pelo menos 10 caracteres.".into());
        return Err(err);
    }
    Ok(())
}

/// Photo must be an inline base64 image within the accepted types and size.
pub fn validate_photo_data_uri(raw: &str) -> Result<(), ValidationError> {
    PhotoDataUri::parse(raw).map(|_| ()).map_err(|e| {
        let mut err = ValidationError::new("invalid_photo");
        err.message = Some(format!("Foto inválida: {}", e).into());
        err
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_type_regex_valid() {
        assert!(MIME_TYPE_REGEX.is_match("image/png"));
        assert!(MIME_TYPE_REGEX.is_match("image/svg+xml"));
        assert!(MIME_TYPE_REGEX.is_match("image/vnd.microsoft.icon"));
    }

    #[test]
    fn test_mime_type_regex_invalid() {
        assert!(!MIME_TYPE_REGEX.is_match("image")); // no subtype
        assert!(!MIME_TYPE_REGEX.is_match("image/")); // empty subtype
        assert!(!MIME_TYPE_REGEX.is_match("/png")); // empty type
        assert!(!MIME_TYPE_REGEX.is_match("image png")); // space
        assert!(!MIME_TYPE_REGEX.is_match(""));
    }

    #[test]
    fn test_validate_description_counts_trimmed_chars() {
        assert!(validate_description("Animal amarrado sem água por dias").is_ok());
        assert!(validate_description("curto").is_err());
        // padding does not count
        assert!(validate_description("   curto     ").is_err());
        // 10 multi-byte characters are enough
        assert!(validate_description("ãããããããããã").is_ok());
    }

    #[test]
    fn test_validate_photo_data_uri_message_is_localized() {
        let err = validate_photo_data_uri("not a photo").unwrap_err();
        assert_eq!(err.code, "invalid_photo");
        assert!(err.message.unwrap().starts_with("Foto inválida"));
    }
}
