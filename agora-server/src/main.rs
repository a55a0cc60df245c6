use agora_server::{api, config, db, password::PasswordHasher, state::AppState};
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "agora_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = config::Settings::new()?;

    let db = db::Database::new(&settings.database.path)?;
    db.initialize()?;
    tracing::info!(path = %settings.database.path, "Database initialized");

    let state = AppState::new(
        db,
        settings.session_ttl()?,
        PasswordHasher::new(settings.auth.bcrypt_cost),
    );

    match state.session_manager.cleanup_expired_sessions() {
        Ok(count) => tracing::info!("Cleaned up {} expired sessions on startup", count),
        Err(e) => tracing::error!("Failed to cleanup expired sessions on startup: {:#}", e),
    }

    // Hourly sweep of expired sessions
    let session_manager = state.session_manager.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(3600));
        loop {
            interval.tick().await;
            tracing::debug!("Running periodic session cleanup");
            if let Err(e) = session_manager.cleanup_expired_sessions() {
                tracing::error!("Periodic session cleanup failed: {:#}", e);
            }
        }
    });

    let app = api::router(state, settings.request_timeout());

    let addr: SocketAddr = settings.bind_address().parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Starting server on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
