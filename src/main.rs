use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{app, AppState};
use screening_core::{
    artifact_dir_from_env_value, data_dir_from_env_value, profiles_file_from_env_value,
    CoreConfig, ScreeningService,
};

/// Main entry point for the screening service
///
/// Resolves configuration from the environment (and `.env`), loads every disease's prediction
/// artifacts and serves the REST API until Ctrl-C.
///
/// # Environment Variables
/// - `SCREENING_REST_ADDR`: REST server address (default: "0.0.0.0:8080")
/// - `SCREENING_DATA_DIR`: Directory holding the per-disease screening logs (default: "Results")
/// - `SCREENING_ARTIFACT_DIR`: Directory holding the prediction artifacts (default: "final_models")
/// - `SCREENING_PROFILES_FILE`: Optional YAML file replacing the built-in disease table
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the configuration is invalid,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("screening=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr =
        std::env::var("SCREENING_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".into());

    let data_dir = data_dir_from_env_value(std::env::var("SCREENING_DATA_DIR").ok());
    let artifact_dir = artifact_dir_from_env_value(std::env::var("SCREENING_ARTIFACT_DIR").ok());
    let profiles_file = profiles_file_from_env_value(std::env::var("SCREENING_PROFILES_FILE").ok())?;

    let cfg = Arc::new(CoreConfig::new(data_dir, artifact_dir, profiles_file)?);
    tracing::info!(
        data_dir = %cfg.data_dir().display(),
        artifact_dir = %cfg.artifact_dir().display(),
        diseases = cfg.profiles().len(),
        "configuration resolved"
    );

    let screening = ScreeningService::new(cfg);
    let rest_app = app(AppState::new(screening));

    tracing::info!("++ Starting screening REST API on {}", rest_addr);

    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, rest_app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("-- Screening REST API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
    }
}
