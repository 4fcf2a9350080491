use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::shared::types::ApiResponse;

#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed or missing input. Each entry describes one rejected field.
    #[error("Validation error: {0:?}")]
    Validation(Vec<String>),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// The AI analysis service failed or returned something unusable
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// A write that did not complete (database error, timeout, closed store, ...)
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// The live listing could not be (re)queried
    #[error("Subscription error: {0}")]
    Subscription(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Localized message shown to the person submitting or browsing reports.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(_) => "Dados de entrada inválidos.".to_string(),
            AppError::BadRequest(msg) => msg.clone(),
            AppError::NotFound(_) => "Denúncia não encontrada.".to_string(),
            AppError::Analysis(_) => {
                "Falha ao analisar a imagem. Tente novamente mais tarde.".to_string()
            }
            AppError::Persistence(_) => {
                "Falha ao salvar a denúncia. Tente novamente.".to_string()
            }
            AppError::Subscription(_) => {
                "Não foi possível buscar os dados do servidor. Por favor, tente novamente mais tarde."
                    .to_string()
            }
            AppError::Internal(_) => "Ocorreu um erro desconhecido.".to_string(),
        }
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Analysis(_) => StatusCode::BAD_GATEWAY,
            AppError::Persistence(_) | AppError::Subscription(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Per-field validation details, if any
    pub fn details(&self) -> Option<&[String]> {
        match self {
            AppError::Validation(details) => Some(details),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Analysis(msg) => tracing::error!("Analysis error: {}", msg),
            AppError::Persistence(msg) => tracing::error!("Persistence error: {}", msg),
            AppError::Subscription(msg) => tracing::error!("Subscription error: {}", msg),
            AppError::Internal(msg) => tracing::error!("Internal error: {}", msg),
            AppError::Validation(_) | AppError::BadRequest(_) | AppError::NotFound(_) => {}
        }

        let body = Json(ApiResponse::<()>::error(
            self.user_message(),
            self.details().map(<[String]>::to_vec),
        ));

        (self.status_code(), body).into_response()
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(msg) => format!("{}: {}", field, msg),
                    None => format!("{}: {}", field, e.code),
                })
            })
            .collect();
        details.sort();
        AppError::Validation(details)
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
