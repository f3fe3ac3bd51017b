use std::sync::Arc;

use rickshaw_booking::api;
use rickshaw_booking::config::Config;
use rickshaw_booking::error::AppError;
use rickshaw_booking::state::AppState;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = Config::from_env()?;

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(config.log_level.clone()))
        .with_target(false);
    if config.log_json {
        subscriber.json().init();
    } else {
        subscriber.compact().init();
    }

    let settings = config.engine_settings();
    tracing::info!(
        base_fare = settings.fare.base_fare,
        per_km_rate = settings.fare.per_km_rate,
        confirmation_delay_ms = config.confirmation_delay_ms,
        unknown_booking = ?settings.unknown_booking,
        active_booking = ?settings.active_booking,
        "booking engine configured"
    );

    let shared_state = Arc::new(AppState::new(settings, config.event_buffer_size));
    let app = api::rest::router(shared_state);

    let bind_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|err| AppError::Internal(format!("failed to bind {bind_addr}: {err}")))?;

    tracing::info!(http_port = config.http_port, "http server started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| AppError::Internal(format!("server error: {err}")))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}
