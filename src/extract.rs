//! Extractors implementing the reject-early validation policy: anything that
//! does not parse into the handler's input type is a 422 before the handler
//! runs, so nothing is persisted for it.

use axum::extract::rejection::PathRejection;
use axum::extract::{FromRequest, FromRequestParts};

use crate::error::{Error, FieldError};

/// `Json<T>` whose rejection is [`Error::Validation`].
///
/// Every field of `T` is required by its `Deserialize` impl, so a body that
/// gets through is complete and well typed.
#[derive(Debug, Clone, Copy, Default, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct ValidJson<T>(pub T);

/// `Path<T>` whose rejection is [`Error::Validation`] (e.g. `/countries/abc`).
#[derive(Debug, Clone, Copy, Default, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(Error))]
pub struct ValidPath<T>(pub T);

impl From<PathRejection> for Error {
    fn from(rejection: PathRejection) -> Self {
        Error::Validation(vec![FieldError {
            loc: vec!["path".to_string()],
            msg: rejection.body_text(),
            kind: "path_error",
        }])
    }
}
