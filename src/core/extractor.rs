use axum::{
    body::Body,
    extract::{rejection::JsonRejection, FromRequest, Request},
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;

use crate::core::error::AppError;

/// JSON extractor whose rejections use the same failure envelope as every
/// other error.
///
/// A body that parses as JSON but has the wrong shape (missing `description`,
/// `photoDataUri` not a string, ...) is a validation failure, not a transport one.
pub struct AppJson<T>(pub T);

impl<T, S> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppJsonRejection;

    async fn from_request(req: Request<Body>, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(value) => Ok(Self(value.0)),
            Err(rejection) => Err(AppJsonRejection(rejection)),
        }
    }
}

pub struct AppJsonRejection(JsonRejection);

impl From<AppJsonRejection> for AppError {
    fn from(rejection: AppJsonRejection) -> Self {
        match rejection.0 {
            JsonRejection::JsonDataError(err) => AppError::Validation(vec![err.body_text()]),
            JsonRejection::JsonSyntaxError(err) => {
                AppError::BadRequest(format!("JSON inválido: {}", err.body_text()))
            }
            JsonRejection::MissingJsonContentType(_) => AppError::BadRequest(
                "Envie os dados com Content-Type: application/json.".to_string(),
            ),
            _ => AppError::BadRequest("Falha ao ler o corpo da requisição.".to_string()),
        }
    }
}

impl IntoResponse for AppJsonRejection {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}
