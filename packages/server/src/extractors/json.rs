use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// JSON request body extractor for the API handlers.
///
/// Replaces axum's plain-text rejections with the validation variant of
/// [`AppError`], so a malformed body comes back as the same
/// `{"code": "VALIDATION_ERROR", ...}` envelope the field validators use.
pub struct AppJson<T>(pub T);

impl<S, T> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(body)) => Ok(AppJson(body)),
            Err(rejection) => {
                let detail = match &rejection {
                    JsonRejection::MissingJsonContentType(_) => {
                        "Expected a request body with Content-Type: application/json".to_string()
                    }
                    _ => rejection.body_text(),
                };
                Err(AppError::Validation(detail))
            }
        }
    }
}
