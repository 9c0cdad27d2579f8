//! Error taxonomy shared by the stores and the HTTP handlers.
//!
//! Every failure a handler can produce is an [`Error`]. Client errors carry a
//! fixed, human readable `detail` and are never retried; backend failures are
//! logged and collapsed into an opaque 500 so no database or session internals
//! leak into responses.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use sea_orm::DbErr;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// One entry of a 422 response's `detail` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Where the problem sits, e.g. `["body", "population"]`.
    pub loc: Vec<String>,
    pub msg: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
}

impl FieldError {
    pub fn body(field: Option<&str>, msg: impl Into<String>, kind: &'static str) -> Self {
        let mut loc = vec!["body".to_string()];
        loc.extend(field.map(str::to_string));
        Self {
            loc,
            msg: msg.into(),
            kind,
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    /// Request body missing, malformed, or of the wrong shape. HTTP 422.
    #[error("request validation failed")]
    Validation(Vec<FieldError>),

    /// Unknown identifier. HTTP 404.
    #[error("{0}")]
    NotFound(&'static str),

    /// Write would violate a uniqueness rule. HTTP 400.
    #[error("{0}")]
    Conflict(&'static str),

    /// Bad credentials or no authenticated session. HTTP 401.
    #[error("{0}")]
    Unauthorized(&'static str),

    #[error("database error: {0}")]
    Database(#[from] DbErr),

    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    #[error("password hashing error: {0}")]
    Password(String),
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Conflict(_) => StatusCode::BAD_REQUEST,
            Error::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Error::Database(_) | Error::Session(_) | Error::Password(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match self {
            Error::Validation(fields) => json!({ "detail": fields }),
            Error::NotFound(msg) | Error::Conflict(msg) | Error::Unauthorized(msg) => {
                json!({ "detail": msg })
            }
            other => {
                tracing::error!(error = %other, "request failed");
                json!({ "detail": "Internal Server Error" })
            }
        };
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        let text = rejection.body_text();
        let field = match &rejection {
            JsonRejection::JsonDataError(_) => missing_or_invalid_field(&text),
            _ => None,
        };
        let kind = match &rejection {
            JsonRejection::JsonDataError(_) if text.contains("missing field") => "missing",
            JsonRejection::JsonDataError(_) => "type_error",
            JsonRejection::JsonSyntaxError(_) => "json_invalid",
            JsonRejection::MissingJsonContentType(_) => "content_type",
            _ => "body_error",
        };
        Error::Validation(vec![FieldError::body(field.as_deref(), text, kind)])
    }
}

/// Pulls the offending field name out of a serde data error message.
///
/// Handles both shapes axum produces: ``missing field `population` `` and
/// `population: invalid type: ...` (the latter carries a serde path prefix).
fn missing_or_invalid_field(text: &str) -> Option<String> {
    if let Some(rest) = text.split("missing field `").nth(1) {
        return rest.split('`').next().map(str::to_string);
    }
    let detail = text.rsplit("target type: ").next()?;
    let (path, _) = detail.split_once(": ")?;
    if path.is_empty() || path == "." || path.contains(' ') {
        return None;
    }
    Some(path.to_string())
}
