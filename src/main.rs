//! Paper Consult server.
//!
//! Startup order: configuration, logging, database, adapters, handlers,
//! background sweep, HTTP. On Ctrl-C or SIGTERM the server stops accepting
//! requests, the sweep stops and in-flight background tasks are drained.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use paper_consult::adapters::postgres::{
    self, PostgresOutreachRepository, PostgresPaperCatalog, PostgresPaymentRepository,
    PostgresResearcherRepository, PostgresSessionRepository, PostgresSubscriptionRepository,
    PostgresUserDirectory,
};
use paper_consult::adapters::resend::{ResendConfig, ResendEmailSender};
use paper_consult::adapters::stripe::StripeWebhookGateway;
use paper_consult::adapters::tasks::{TaskRunnerConfig, TokioTaskRunner};
use paper_consult::adapters::zoom::{ZoomConfig, ZoomMeetingProvider};
use paper_consult::app::{run_outreach_sweep, AppSettings, Application, Collaborators};
use paper_consult::config::{AppConfig, ConfigError, ServerConfig, ValidationError};
use paper_consult::ports::MeetingProvider;

#[derive(Debug, Error)]
enum StartupError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid configuration: {0}")]
    Validation(#[from] ValidationError),

    #[error("database: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migrations: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("http client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("server: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    let config = AppConfig::load()?;
    init_tracing(&config.server);
    config.validate()?;

    tracing::info!(
        environment = ?config.server.environment,
        "Configuration loaded. Starting Paper Consult..."
    );

    let pool = postgres::connect(&config.database).await?;
    if config.database.run_migrations {
        tracing::info!("Running database migrations...");
        postgres::run_migrations(&pool).await?;
    }

    let email = ResendEmailSender::new(ResendConfig {
        api_key: config.email.resend_api_key.clone(),
        from: config.email.from_header(),
        base_url: config.email.api_base_url.clone(),
        timeout: config.email.timeout(),
    })?;

    let meetings: Option<Arc<dyn MeetingProvider>> = match config.meeting.credentials() {
        Some(credentials) => {
            let provider: Arc<dyn MeetingProvider> = Arc::new(ZoomMeetingProvider::new(ZoomConfig {
                api_key: credentials.api_key.to_string(),
                api_secret: credentials.api_secret.clone(),
                user_id: config.meeting.user_id.clone(),
                base_url: config.meeting.api_base_url.clone(),
                timeout: config.meeting.timeout(),
            })?);
            Some(provider)
        }
        None => {
            tracing::warn!("No meeting provider configured; sessions will be booked without video links");
            None
        }
    };

    let tasks = Arc::new(TokioTaskRunner::new(
        TaskRunnerConfig::default()
            .with_max_attempts(config.consulting.task_max_attempts)
            .with_retry_backoff(config.consulting.task_retry_backoff()),
    ));

    let ports = Collaborators {
        users: Arc::new(PostgresUserDirectory::new(pool.clone())),
        papers: Arc::new(PostgresPaperCatalog::new(pool.clone())),
        researchers: Arc::new(PostgresResearcherRepository::new(pool.clone())),
        outreach: Arc::new(PostgresOutreachRepository::new(pool.clone())),
        sessions: Arc::new(PostgresSessionRepository::new(pool.clone())),
        payments: Arc::new(PostgresPaymentRepository::new(pool.clone())),
        subscriptions: Arc::new(PostgresSubscriptionRepository::new(pool.clone())),
        email: Arc::new(email),
        meetings,
        gateway: Arc::new(
            StripeWebhookGateway::new(config.payment.stripe_webhook_secret.clone())
                .with_tolerance_secs(config.payment.signature_tolerance_secs),
        ),
        tasks: tasks.clone(),
    };

    let application = Application::build(ports, AppSettings::from_config(&config));
    let router = application.router(&config.server);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweep = tokio::spawn(run_outreach_sweep(
        application.sweep.clone(),
        config.consulting.sweep_interval(),
        config.consulting.stale_outreach_age(),
        shutdown_rx,
    ));

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutting down; draining background tasks");
    let _ = shutdown_tx.send(true);
    if let Err(e) = sweep.await {
        tracing::error!(error = %e, "Outreach sweep task panicked");
    }
    tasks.wait_idle().await;
    pool.close().await;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn init_tracing(server: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(server.log_level.clone()));

    if server.is_production() {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
