//! Startup helpers for the alimtalk studio server.

use std::future::Future;
use std::process::ExitCode;
use std::sync::Arc;

use crate::server::{self, AppState};
use crate::studio::core::config::StudioConfig;
use crate::studio::core::errors::StudioResult;

/// Run the studio server until it stops.
///
/// # Returns
/// `ExitCode::SUCCESS` on graceful shutdown, `1` on failure.
#[must_use]
pub fn run() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Starting alimtalk studio v{}", env!("CARGO_PKG_VERSION"));

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to create runtime: {e}");
            return ExitCode::from(1);
        }
    };

    let (state, port) = match rt.block_on(initialize()) {
        Ok(ready) => ready,
        Err(e) => {
            tracing::error!("Failed to initialize studio: {e}");
            return ExitCode::from(1);
        }
    };

    if let Err(e) = rt.block_on(server::run_server(state, port)) {
        tracing::error!("Server error: {e}");
        return ExitCode::from(1);
    }

    ExitCode::SUCCESS
}

/// Load configuration from the environment and build application state.
///
/// Returns the state and the configured port.
///
/// # Errors
/// Returns an error if configuration, storage, or the template client fails.
pub async fn initialize() -> StudioResult<(Arc<AppState>, u16)> {
    let config = StudioConfig::from_env()?;
    tracing::info!(
        "Template service: {}{} (policy {:?})",
        config.service.base_url,
        config.service.templates_path,
        config.service.failure_policy
    );
    let port = config.server.port;
    Ok((AppState::from_config(config).await?, port))
}

/// Run server with graceful shutdown.
///
/// # Errors
/// Returns an error if the server fails.
pub async fn run_server_with_shutdown<F>(
    state: Arc<AppState>,
    port: u16,
    shutdown_signal: F,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
where
    F: Future<Output = ()> + Send + 'static,
{
    server::run_server_with_shutdown(state, port, shutdown_signal).await
}
