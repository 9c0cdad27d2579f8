use latam_countries::{app, config::Settings};
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .env is optional
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .init();

    let settings = Settings::new().inspect_err(|e| {
        tracing::error!(error = %e, "invalid configuration");
    })?;

    app::run(settings).await
}
