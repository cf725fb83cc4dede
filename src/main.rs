use std::env;
use std::net::SocketAddr;

use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

use survey_payroll::api::{AppState, create_router};
use survey_payroll::config::ConfigLoader;

const DEFAULT_CONFIG_DIR: &str = "./config/standard";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config_dir = env::var("PAYROLL_CONFIG_DIR").unwrap_or_else(|_| DEFAULT_CONFIG_DIR.into());
    let addr: SocketAddr = env::var("PAYROLL_BIND_ADDR")
        .unwrap_or_else(|_| DEFAULT_BIND_ADDR.into())
        .parse()?;

    let config = ConfigLoader::load(&config_dir)?;
    let app = create_router(AppState::in_memory(config));

    info!(%addr, config_dir = %config_dir, "Payroll API listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
