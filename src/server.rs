//! HTTP server initialization and runtime setup.
//!
//! Wires the stores, cache, classifier and notifier into the services, starts
//! the visit worker and runs the Axum server until a shutdown signal arrives.

use crate::application::services::{AuthService, LinkService, RedirectService, TrackingService};
use crate::config::Config;
use crate::domain::alert_policy::AlertPolicy;
use crate::domain::visit_worker::run_visit_worker;
use crate::infrastructure::cache::{CacheService, NullCache, RedisCache};
use crate::infrastructure::classifier::SignatureClassifier;
use crate::infrastructure::notifier::{LogNotifier, Notifier, SendGridNotifier};
use crate::infrastructure::persistence::{PgClickRepository, PgLinkRepository, PgTokenRepository};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::sync::mpsc;

/// How long queued visits may take to drain after the server stops.
const WORKER_DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool and migrations
/// - Redis cache (or NullCache fallback)
/// - Bot signatures and the alert notifier
/// - Background visit worker
/// - Axum HTTP server with graceful shutdown
///
/// On shutdown the visit queue is closed and the worker gets
/// [`WORKER_DRAIN_TIMEOUT`] to finish what was already accepted.
///
/// # Errors
///
/// Returns an error if the database, the signature file or the listener
/// cannot be set up, or the server fails at runtime.
pub async fn run(config: Config) -> Result<()> {
    let pool = connect_database(&config).await?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    let cache = connect_cache(&config).await;

    let classifier = SignatureClassifier::load(&config.bot_signatures_path, &config.preview_ip_ranges)
        .context("Failed to load bot signatures")?;

    let notifier: Arc<dyn Notifier> = match &config.sendgrid_api_key {
        Some(api_key) => {
            tracing::info!("Alert delivery via SendGrid");
            Arc::new(
                SendGridNotifier::new(api_key.as_str(), config.emails_from.as_str())
                    .context("Failed to build SendGrid client")?,
            )
        }
        None => {
            tracing::warn!("SENDGRID_API_KEY not set, click alerts will only be logged");
            Arc::new(LogNotifier)
        }
    };

    let pool = Arc::new(pool);
    let link_repository = Arc::new(PgLinkRepository::new(pool.clone()));
    let click_repository = Arc::new(PgClickRepository::new(pool.clone()));
    let token_repository = Arc::new(PgTokenRepository::new(pool.clone()));

    let short_url_base = config.short_url_base();

    let tracking_service = Arc::new(TrackingService::new(
        link_repository.clone(),
        click_repository,
        Arc::new(classifier),
        notifier,
        AlertPolicy::new(
            config.max_alerts,
            short_url_base.as_str(),
            config.alerts_contact_email.as_str(),
        ),
    ));

    let (visit_tx, visit_rx) = mpsc::channel(config.click_queue_capacity);
    let worker = tokio::spawn(run_visit_worker(
        visit_rx,
        tracking_service,
        config.click_worker_concurrency,
    ));

    let state = AppState {
        redirect_service: Arc::new(RedirectService::new(link_repository.clone(), cache.clone())),
        link_service: Arc::new(LinkService::new(
            link_repository,
            config.redirect_path_length,
            short_url_base,
        )),
        auth_service: Arc::new(AuthService::new(
            token_repository,
            config.token_signing_secret.clone(),
        )),
        cache,
        visit_sender: visit_tx,
        error_redirect_url: Arc::from(config.error_redirect_url.as_str()),
    };

    let app = app_router(state, config.behind_proxy);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid LISTEN address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Listening on http://{addr}");

    // The router owns the only visit sender; once serving stops it is dropped
    // and the worker sees the queue close.
    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    match tokio::time::timeout(WORKER_DRAIN_TIMEOUT, worker).await {
        Ok(Ok(())) => tracing::info!("Visit queue drained"),
        Ok(Err(e)) => tracing::error!(error = %e, "Visit worker failed"),
        Err(_) => tracing::warn!(
            timeout_secs = WORKER_DRAIN_TIMEOUT.as_secs(),
            "Visit worker did not drain in time, pending visits dropped"
        ),
    }

    Ok(())
}

async fn connect_database(config: &Config) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    tracing::info!(
        max_connections = config.db_max_connections,
        "Connected to database"
    );

    Ok(pool)
}

async fn connect_cache(config: &Config) -> Arc<dyn CacheService> {
    let Some(redis_url) = &config.redis_url else {
        tracing::info!("Cache disabled (NullCache)");
        return Arc::new(NullCache::new());
    };

    match RedisCache::connect(redis_url, config.cache_ttl_seconds).await {
        Ok(redis) => {
            tracing::info!("Cache enabled (Redis)");
            Arc::new(redis)
        }
        Err(e) => {
            tracing::warn!("Failed to connect to Redis: {}. Using NullCache.", e);
            Arc::new(NullCache::new())
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
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
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
