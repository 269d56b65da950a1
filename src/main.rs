//! Booking Server
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tracing;
use tracing_subscriber::{EnvFilter, fmt};

use booking_core::config::AppConfig;
use booking_core::error::AppError;
use booking_core::traits::{Clock, SystemClock};
use booking_database::{
    BookingSessionRepository, DatabasePool, MemoryBookingStore, ReservationStore,
    SeatReservationRepository, SessionStore,
};
use booking_gateway::{HttpAvailabilityGateway, HttpPaymentGateway};
use booking_service::{BookingSessionManager, ReservationManager};
use booking_worker::{CronScheduler, ExpirySweeper};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from files and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("BOOKING_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Store handles plus the pool backing them, if any.
struct Stores {
    reservations: Arc<dyn ReservationStore>,
    sessions: Arc<dyn SessionStore>,
    pool: Option<DatabasePool>,
}

/// Open the configured store, running migrations against PostgreSQL.
async fn open_stores(config: &AppConfig) -> Result<Stores, AppError> {
    if config.database.is_memory() {
        tracing::warn!("Using in-memory store; state is lost on restart");
        let store = Arc::new(MemoryBookingStore::new());
        return Ok(Stores {
            reservations: store.clone(),
            sessions: store,
            pool: None,
        });
    }

    tracing::info!("Connecting to database...");
    let pool = DatabasePool::connect(&config.database).await?;

    tracing::info!("Running database migrations...");
    booking_database::migration::run_migrations(pool.pool()).await?;
    tracing::info!("Database migrations complete");

    Ok(Stores {
        reservations: Arc::new(SeatReservationRepository::new(pool.pool().clone())),
        sessions: Arc::new(BookingSessionRepository::new(pool.pool().clone())),
        pool: Some(pool),
    })
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting booking server v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Stores ───────────────────────────────────────────
    let stores = open_stores(&config).await?;

    // ── Step 2: Upstream gateways ────────────────────────────────
    let availability = Arc::new(HttpAvailabilityGateway::new(
        &config.gateways.availability,
    )?);
    let payments = Arc::new(HttpPaymentGateway::new(&config.gateways.payment)?);
    tracing::info!(
        availability = %config.gateways.availability.base_url,
        payment = %config.gateways.payment.base_url,
        "Upstream gateways configured"
    );

    // ── Step 3: Managers ─────────────────────────────────────────
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let reservations = Arc::new(ReservationManager::new(
        stores.reservations,
        stores.sessions.clone(),
        availability,
        clock.clone(),
        config.booking.clone(),
    ));
    let sessions = Arc::new(BookingSessionManager::new(
        stores.sessions,
        reservations.clone(),
        payments,
        clock.clone(),
        config.booking.clone(),
    ));

    // ── Step 4: Expiry sweeper ───────────────────────────────────
    let mut scheduler = if config.sweeper.enabled {
        let sweeper = Arc::new(ExpirySweeper::new(sessions.clone(), reservations.clone()));
        let scheduler = CronScheduler::new().await?;
        scheduler
            .register_expiry_sweep(&config.sweeper, sweeper, clock.clone())
            .await?;
        scheduler.start().await?;
        Some(scheduler)
    } else {
        tracing::info!("Expiry sweeper disabled");
        None
    };

    // ── Step 5: Build router ─────────────────────────────────────
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let grace = std::time::Duration::from_secs(config.server.shutdown_grace_seconds);

    let app_state = booking_api::AppState {
        config: Arc::new(config),
        clock,
        database: stores.pool.clone(),
        sessions,
        reservations,
    };
    let app = booking_api::build_router(app_state);

    // ── Step 6: Bind and serve ───────────────────────────────────
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("Booking server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_signal().await;
            tracing::info!("Shutdown signal received, starting graceful shutdown...");
        })
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    // ── Step 7: Stop background work ─────────────────────────────
    if let Some(scheduler) = scheduler.as_mut() {
        match tokio::time::timeout(grace, scheduler.shutdown()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!(error = %e, "Scheduler shutdown failed"),
            Err(_) => tracing::warn!("Scheduler did not stop within the grace period"),
        }
    }
    if let Some(pool) = stores.pool {
        pool.close().await;
    }

    tracing::info!("Booking server shut down gracefully");
    Ok(())
}

/// Wait for a shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
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
