//! SeaORM entities for the three tables the service owns.
//!
//! `country` and `user` back the public API; `session` is the server-side
//! storage behind the session cookie and is only touched through
//! [`SeaOrmStore`](crate::session_store::SeaOrmStore).

/// Countries exposed through `/countries`.
pub mod country;

/// Persisted session records.
pub mod session;

/// Registered accounts.
pub mod user;
