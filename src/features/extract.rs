use crate::error::ProxyError;
use axum::Json;
use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use axum::extract::rejection::JsonRejection;
use serde::de::DeserializeOwned;

/// `axum::Json`, but a bad body is reported as a `validation_error` (400)
/// instead of axum's plain-text 415/422.
pub struct ToolJson<T>(pub T);

impl<S, T> FromRequest<S> for ToolJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ProxyError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ProxyError::Validation(rejection.body_text()))?;
        Ok(Self(value))
    }
}

/// For endpoints whose body is optional: an empty body yields `T::default()`.
pub fn parse_optional_body<T>(body: &Bytes) -> Result<T, ProxyError>
where
    T: DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| ProxyError::Validation(format!("Failed to parse the request body as JSON: {e}")))
}
