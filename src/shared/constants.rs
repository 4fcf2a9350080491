/// Minimum number of characters in an incident description
pub const DESCRIPTION_MIN_CHARS: u64 = 10;

/// Maximum number of characters in an incident description
pub const DESCRIPTION_MAX_CHARS: u64 = 5000;

/// Maximum length of the optional free-text fields (location, name, contact)
pub const OPTIONAL_FIELD_MAX_CHARS: u64 = 255;

/// Maximum decoded size of the attached photo (5MB)
pub const MAX_PHOTO_SIZE: usize = 5 * 1024 * 1024;

/// Photo MIME types accepted by the intake pipeline
pub const ALLOWED_PHOTO_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "image/heic",
];

// =============================================================================
// DISPLAY FALLBACKS
// =============================================================================

/// Stored reporter name when the submitter leaves it blank
pub const ANONYMOUS_REPORTER: &str = "Anônimo";

/// Shown when a report has no location
pub const LOCATION_NOT_INFORMED: &str = "Local não informado";

/// Shown when a report has no contact
pub const CONTACT_NOT_INFORMED: &str = "Não informado";

/// Shown when a report timestamp has not been populated yet
pub const DATE_NOT_AVAILABLE: &str = "Data não disponível";
