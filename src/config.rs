//! Layered settings: built-in defaults, then an optional `config.toml`, then
//! `LATAM__*` environment variables (`LATAM__DATABASE__URL`,
//! `LATAM__SESSION__SECURE`, ...).

use std::net::SocketAddr;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File, FileFormat};
use sea_orm::ConnectOptions;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Database {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub sql_logging: bool,
}

impl Database {
    pub fn connect_options(&self) -> ConnectOptions {
        let timeout = Duration::from_secs(self.connect_timeout_secs);
        let mut opt = ConnectOptions::new(self.url.clone());
        opt.max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .connect_timeout(timeout)
            .acquire_timeout(timeout)
            .sqlx_logging(self.sql_logging);
        opt
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    pub host: String,
    pub port: u16,
}

impl Server {
    pub fn addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub cookie_name: String,
    /// Sessions expire after this many hours without a request.
    pub inactivity_hours: i64,
    pub secure: bool,
    pub cleanup_interval_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Auth {
    /// Require a logged-in session for every `/countries` route.
    pub protect_countries: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub database: Database,
    pub server: Server,
    pub session: Session,
    pub auth: Auth,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::builder()?
            .add_source(
                File::with_name("config.toml")
                    .format(FileFormat::Toml)
                    .required(false),
            )
            .add_source(Environment::with_prefix("LATAM").separator("__"))
            .build()?
            .try_deserialize()
    }

    // Defaults come from `Settings::default()` so the two cannot drift
    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Ok(Config::builder().add_source(Config::try_from(&Settings::default())?))
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database: Database {
                url: "sqlite://latam_countries.db?mode=rwc".into(),
                max_connections: 10,
                min_connections: 1,
                connect_timeout_secs: 10,
                sql_logging: false,
            },
            server: Server {
                host: "127.0.0.1".into(),
                port: 8000,
            },
            session: Session {
                cookie_name: "session".into(),
                inactivity_hours: 24,
                secure: false,
                cleanup_interval_secs: 3600,
            },
            auth: Auth {
                protect_countries: false,
            },
        }
    }
}
