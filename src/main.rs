use anyhow::Context;
use dotenvy::dotenv;
use tokio_util::sync::CancellationToken;
use tracing::info;
use vitrine::jobs::FilterCacheJob;
use vitrine::logging::{init_tracing, shutdown_tracer};
use vitrine::metrics::init_metrics;
use vitrine::router::init_router;
use vitrine::state::init_app_state;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    init_tracing().context("Failed to initialize logging")?;
    let metrics_handle = init_metrics();

    let state = init_app_state().await?;
    let shutdown = CancellationToken::new();

    let job = if state.aggregator_config.enabled {
        Some(tokio::spawn(
            FilterCacheJob::from_state(&state).run(shutdown.child_token()),
        ))
    } else {
        info!("Filter cache job disabled (AGGREGATOR_ENABLED=false)");
        None
    };

    let address = state.server_config.bind_address();
    let app = init_router(state, metrics_handle);

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;
    info!(address = %address, "Server listening");
    info!("Scalar UI available at http://{address}/scalar");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
        .await
        .context("Server error")?;

    shutdown.cancel();
    if let Some(job) = job {
        let _ = job.await;
    }
    shutdown_tracer().await;

    Ok(())
}

async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
        _ = token.cancelled() => {},
    }

    info!("Shutdown signal received");
    token.cancel();
}
