use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Uniform result envelope returned by every JSON endpoint.
///
/// Success: `{"success": true, "data": ..., "message": ...}`.
/// Failure: `{"success": false, "error": "<localized message>", "errors": [...]}`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: Option<T>, message: Option<String>) -> Self {
        Self {
            success: true,
            data,
            message,
            error: None,
            errors: None,
        }
    }

    pub fn error(error: String, errors: Option<Vec<String>>) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            message: None,
            error: Some(error),
            errors,
        }
    }
}
