//! HTTP handlers. Thin: extract, call a store, wrap the result in JSON.

pub mod auth;
pub mod countries;

use serde::Serialize;

/// `{"message": ...}` confirmation body.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub message: &'static str,
}

impl Message {
    pub const fn new(message: &'static str) -> Self {
        Self { message }
    }
}
