//! Error taxonomy shared by every page operation.
//!
//! Handlers return `Result<_, ProxyError>`; the `IntoResponse` impl turns each
//! kind into its status code and a JSON body of the form
//! `{"error": "<kind>", "message": "<text>"}`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProxyError {
    /// Missing or malformed input, or input the wiki refused.
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    /// The page path is already taken.
    #[error("{0}")]
    Conflict(String),
    /// Network failure, auth rejection, non-2xx status or unreadable reply.
    #[error("Wiki.js API error: {0}")]
    UpstreamUnavailable(String),
    #[error("Wiki.js API timeout: {0}")]
    UpstreamTimeout(String),
}

impl ProxyError {
    /// Machine-readable kind reported to the tool-calling client.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::NotFound(_) => "not_found",
            Self::Conflict(_) => "conflict",
            Self::UpstreamUnavailable(_) => "upstream_unavailable",
            Self::UpstreamTimeout(_) => "upstream_timeout",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::UpstreamUnavailable(_) => StatusCode::BAD_GATEWAY,
            Self::UpstreamTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            Self::UpstreamUnavailable(_) | Self::UpstreamTimeout(_)
        )
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        if self.is_upstream() {
            tracing::warn!(kind = self.kind(), error = %self, "upstream call failed");
        } else {
            tracing::debug!(kind = self.kind(), error = %self, "request rejected");
        }
        let body = serde_json::json!({
            "error": self.kind(),
            "message": self.to_string(),
        });
        (status, Json(body)).into_response()
    }
}
