//! Errors related to inbound gateway authentication.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Detail text returned to callers on every authentication failure.
pub const UNAUTHORIZED_DETAIL: &str = "Unauthorized";

/// The `Unauthorized` class: the inbound credential is missing or wrong.
///
/// Both variants produce the same 401 response so callers cannot tell a
/// missing token from a wrong one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Neither `X-API-Token` nor a Bearer credential was usable.
    #[error("gateway token was not provided")]
    MissingToken,

    /// A credential was presented but differs from the configured token.
    #[error("gateway token does not match")]
    InvalidToken,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "detail": UNAUTHORIZED_DETAIL })),
        )
            .into_response()
    }
}
