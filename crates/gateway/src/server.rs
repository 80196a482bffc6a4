use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use axum_server::{tls_rustls::RustlsConfig, Handle};
use tracing::{debug, info};

use crate::{build_router, GatewayState};

const GRACEFUL_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

/// Serve the dev site until `shutdown` resolves. HTTPS is used when TLS is
/// enabled and the certificate files exist.
pub async fn serve<F>(state: GatewayState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let config = state.config.clone();
    let address: SocketAddr = config
        .bind_address()
        .parse()
        .with_context(|| format!("invalid bind address {}", config.bind_address()))?;
    let app = build_router(state);

    if config.tls_active() {
        if rustls::crypto::ring::default_provider()
            .install_default()
            .is_err()
        {
            debug!("rustls crypto provider already installed");
        }

        let tls = RustlsConfig::from_pem_file(&config.tls.cert_path, &config.tls.key_path)
            .await
            .context("failed to load TLS certificate")?;

        let handle = Handle::new();
        let shutdown_handle = handle.clone();
        tokio::spawn(async move {
            shutdown.await;
            shutdown_handle.graceful_shutdown(Some(GRACEFUL_SHUTDOWN_TIMEOUT));
        });

        info!(%address, origin = %config.public_origin(), "dev server listening");
        axum_server::bind_rustls(address, tls)
            .handle(handle)
            .serve(app.into_make_service())
            .await
            .context("dev server terminated unexpectedly")?;
    } else {
        let listener = tokio::net::TcpListener::bind(address)
            .await
            .with_context(|| format!("failed to bind {address}"))?;

        info!(%address, origin = %config.public_origin(), "dev server listening");
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .context("dev server terminated unexpectedly")?;
    }

    info!("dev server stopped");
    Ok(())
}
