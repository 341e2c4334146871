use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tower_http::services::ServeDir;
use tracing::{error, info, warn};

use tourbook_api::{build_router, AppState, Gateways, StateSettings};
use tourbook_infrastructure::mail::{MailQueueConfig, MailTemplates};
use tourbook_infrastructure::{
    create_pool, run_migrations, LocalPhotoStorage, LogTransport, MailTransport, PgStore,
    QueuedNotifier, SmtpTransport,
};
use tourbook_shared::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;

    // Keep the guard until exit so file logs are flushed
    let _log_guard = tourbook_shared::telemetry::init_telemetry(config.app.log_dir.as_deref())?;
    info!("{} starting in {} mode...", config.app.name, config.app.env);

    // Connect to Database
    let pool = create_pool(
        &config.database.url,
        config.database.max_connections,
        config.database.min_connections,
    )
    .await?;
    info!("Database connection established.");
    run_migrations(&pool).await?;
    info!("Migrations applied.");

    let repositories = PgStore::repositories(pool);

    // Mail delivery runs off the request path
    let transport: Arc<dyn MailTransport> = if config.mail.smtp_host.trim().is_empty() {
        warn!("mail.smtp_host is empty, outgoing mail is only logged");
        Arc::new(LogTransport)
    } else {
        Arc::new(SmtpTransport::new(&config.mail)?)
    };
    let (notifier, mail_worker) = QueuedNotifier::start(
        transport,
        MailTemplates::new(config.app.name.clone())?,
        MailQueueConfig {
            queue_capacity: config.mail.queue_capacity,
            max_attempts: config.mail.max_attempts,
            ..MailQueueConfig::default()
        },
    );

    let photos = LocalPhotoStorage::new(&config.storage.photo_dir);
    let thumbs = ServeDir::new(photos.root());

    let state = AppState::new(
        &repositories,
        Gateways {
            notifier: Arc::new(notifier.clone()),
            mailer: Arc::new(notifier),
            photos: Arc::new(photos),
        },
        StateSettings::from(&config),
    );

    let app = build_router(state).nest_service("/activities/thumbs", thumbs);

    // Bind address
    let host: std::net::IpAddr = config.app.host.parse()?;
    let addr = SocketAddr::from((host, config.app.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The router held the last notifier handles; let queued mail drain.
    info!("Server stopped, draining mail queue...");
    if tokio::time::timeout(Duration::from_secs(10), mail_worker).await.is_err() {
        error!("Mail queue did not drain in time, pending mail is dropped");
    }

    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
