//! # latam-countries
//!
//! A small JSON API over a catalogue of countries, with username/password
//! accounts and cookie-based sessions.
//!
//! Built on [axum](https://crates.io/crates/axum) for HTTP,
//! [Sea-ORM](https://crates.io/crates/sea-orm) for persistence (sqlite or
//! postgres) and [`tower-sessions`](https://crates.io/crates/tower-sessions)
//! for sessions, which are stored server-side in the same database through
//! [`SeaOrmStore`].
//!
//! ## Routes
//!
//! | Method | Path              | Success                                   | Failure             |
//! |--------|-------------------|-------------------------------------------|---------------------|
//! | GET    | `/countries`      | 200, array of countries                   |                     |
//! | POST   | `/countries`      | 200, the created country                  | 422                 |
//! | GET    | `/countries/{id}` | 200, the country                          | 404                 |
//! | PUT    | `/countries/{id}` | 200, the replaced country                 | 404, 422            |
//! | DELETE | `/countries/{id}` | 200, `{"message": "Country deleted successfully"}` | 404        |
//! | POST   | `/signup`         | 200, `{"id", "username"}`                 | 400 (name taken)    |
//! | POST   | `/login`          | 200, sets the session cookie              | 401                 |
//! | POST   | `/logout`         | 200                                       |                     |
//! | GET    | `/me`             | 200, `{"id", "username"}`                 | 401                 |
//!
//! Country routes are anonymous unless `auth.protect_countries` is set, see
//! [`config::Auth`].
//!
//! ## Embedding
//!
//! ```no_run
//! use latam_countries::{app, config::Settings};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = Settings::new()?;
//! let db = app::connect(&settings.database).await?;
//! let router = app::router(db, &settings);
//!
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8000").await?;
//! axum::serve(listener, router).await?;
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod auth;
pub mod config;
pub mod country;
pub mod entity;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod migration;
mod session_store;

pub use app::AppState;
pub use error::{Error, Result};

/// Sea-ORM backed `tower_sessions::SessionStore`.
pub use session_store::SeaOrmStore;
