use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use dtr_payroll::api::{AppState, create_router};
use dtr_payroll::config::ConfigLoader;

const DEFAULT_CONFIG_DIR: &str = "./config/default";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG, default info
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config_dir = std::env::var("CONFIG_DIR").unwrap_or_else(|_| DEFAULT_CONFIG_DIR.to_string());
    let config = ConfigLoader::load(&config_dir)
        .with_context(|| format!("loading configuration from {config_dir}"))?;
    info!(
        config_dir = %config_dir,
        deduction_types = config.catalog().types().len(),
        seed_holidays = config.national_holidays().len(),
        "Configuration loaded"
    );

    let addr = config.settings().server.bind_address.clone();
    let app = create_router(AppState::new(config));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
