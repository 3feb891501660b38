mod config;
mod error;
mod server;

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use diagnosis_core::catalogue::Catalogue;
use diagnosis_core::fonts::FontProfile;
use diagnosis_core::intake::Intake;
use diagnosis_core::report::ReportRenderer;
use diagnosis_core::serial::SerialAllocator;
use diagnosis_core::store::ResultStore;

use config::Config;
use server::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    info!("starting diagnosis server");

    let config = Config::from_env()?;
    info!(
        resource_root = %config.resource_root.display(),
        listen_addr = %config.listen_addr,
        serial_prefix = %config.serial_prefix,
        "configuration loaded"
    );

    let catalogue = Arc::new(Catalogue::load_or_empty(&config.catalogue_path())?);
    let fonts = FontProfile::resolve(&config.font_path);

    let intake = Intake::new(
        SerialAllocator::new(config.serial_path(), config.serial_prefix.clone()),
        ResultStore::new(config.results_dir(), config.roster_path()),
    );
    let state = AppState::new(catalogue, intake, ReportRenderer::new(fonts));
    let app = server::create_router(state, config.static_root());

    let listener = TcpListener::bind(&config.listen_addr).await?;
    info!(listen_addr = %config.listen_addr, "diagnosis server ready");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("diagnosis server shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
