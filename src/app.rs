//! Router assembly and server lifecycle.

use std::time::Duration;

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use sea_orm::{Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use time::Duration as TimeDuration;
use tokio::task::JoinHandle;
use tower_sessions::{Expiry, ExpiredDeletion, SessionManagerLayer};

use crate::auth::{self, UserStore};
use crate::config::{self, Settings};
use crate::country::CountryStore;
use crate::handlers::{auth as auth_handlers, countries};
use crate::migration::Migrator;
use crate::session_store::SeaOrmStore;

/// State shared by every handler. Cloning is cheap: the stores only hold the
/// pooled connection handle.
#[derive(Debug, Clone)]
pub struct AppState {
    pub countries: CountryStore,
    pub users: UserStore,
}

impl AppState {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            countries: CountryStore::new(db.clone()),
            users: UserStore::new(db),
        }
    }
}

/// Connects with the configured pool options and brings the schema up to date.
pub async fn connect(settings: &config::Database) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(settings.connect_options()).await?;
    Migrator::up(&db, None).await?;
    Ok(db)
}

pub fn session_layer(
    db: DatabaseConnection,
    settings: &config::Session,
) -> SessionManagerLayer<SeaOrmStore> {
    SessionManagerLayer::new(SeaOrmStore::new(db))
        .with_name(settings.cookie_name.clone())
        .with_secure(settings.secure)
        .with_expiry(Expiry::OnInactivity(TimeDuration::hours(
            settings.inactivity_hours,
        )))
}

/// Builds the full application: routes, session layer and, when configured,
/// the login requirement on `/countries`.
pub fn router(db: DatabaseConnection, settings: &Settings) -> Router {
    let state = AppState::new(db.clone());

    let mut country_routes = Router::new()
        .route(
            "/countries",
            get(countries::list_countries).post(countries::create_country),
        )
        .route(
            "/countries/{id}",
            get(countries::get_country)
                .put(countries::update_country)
                .delete(countries::delete_country),
        );
    if settings.auth.protect_countries {
        country_routes = country_routes.route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_login,
        ));
    }

    Router::new()
        .merge(country_routes)
        .route("/signup", post(auth_handlers::signup))
        .route("/login", post(auth_handlers::login))
        .route("/logout", post(auth_handlers::logout))
        .route("/me", get(auth_handlers::me))
        .with_state(state)
        .layer(session_layer(db, &settings.session))
}

/// Periodically removes expired sessions until the runtime shuts down.
pub fn spawn_session_cleanup(store: SeaOrmStore, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            if let Err(e) = store.delete_expired().await {
                tracing::warn!(error = %e, "expired session cleanup failed");
            }
        }
    })
}

/// Connects, migrates, and serves until Ctrl-C.
pub async fn run(settings: Settings) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("connecting to database");
    let db = connect(&settings.database).await?;
    tracing::info!("database ready");

    let cleanup = spawn_session_cleanup(
        SeaOrmStore::new(db.clone()),
        Duration::from_secs(settings.session.cleanup_interval_secs.max(1)),
    );

    if !settings.auth.protect_countries {
        tracing::warn!("country routes accept anonymous requests (auth.protect_countries = false)");
    }

    let app = router(db, &settings);

    let addr = settings.server.addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    cleanup.abort();
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
