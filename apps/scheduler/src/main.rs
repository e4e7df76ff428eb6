use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use availability_cell::AvailabilityChecker;
use browser_pool_cell::BrowserPool;
use dotenv::dotenv;
use executor_cell::BookingExecutor;
use monitoring_cell::{create_monitoring_router, AvailabilityService, HealthMonitorService, MetricsCollectorService};
use notifier_cell::{LoggingNotifier, NotificationDispatcher};
use recovery_cell::RecoveryOrchestrator;
use reservation_queue_cell::Store;
use scheduler_cell::{HealthGate, PassthroughUserDirectory, Scheduler};
use shared_config::Settings;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower_http::trace::{self, TraceLayer};
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn court_urls(settings: &Settings) -> HashMap<u32, String> {
    let template = std::env::var("COURT_SCHEDULE_URL_TEMPLATE")
        .unwrap_or_else(|_| "https://reservas.example.com/court/{court}/schedule".to_string());
    settings
        .courts
        .iter()
        .map(|&court| (court, template.replace("{court}", &court.to_string())))
        .collect()
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("starting reservation scheduler");

    let settings = Settings::from_env();
    let webdriver_url = std::env::var("WEBDRIVER_URL").unwrap_or_else(|_| "http://localhost:4444".to_string());
    let emergency_url = std::env::var("EMERGENCY_SCHEDULE_URL")
        .unwrap_or_else(|_| "https://reservas.example.com/emergency/schedule".to_string());
    let queue_path = std::env::var("QUEUE_STORE_PATH").unwrap_or_else(|_| "data/queue.json".to_string());

    let factory = Arc::new(browser_pool_cell::FantocciniSessionFactory { webdriver_url });
    let urls = court_urls(&settings);
    let pool = Arc::new(BrowserPool::new(urls.clone(), factory.clone()));
    pool.start().await.ok();

    let recovery = Arc::new(RecoveryOrchestrator::new(pool.clone(), factory, emergency_url).with_recovery_timeout(
        Duration::from_secs(settings.recovery_timeout_seconds),
    ));
    let health_gate = HealthGate::new(pool.clone(), recovery.clone());

    let store = Arc::new(Store::load(&queue_path).await);
    let executor = Arc::new(BookingExecutor::new(settings.max_retries, Duration::from_secs(settings.attempt_budget_seconds)));
    let dispatcher = Arc::new(NotificationDispatcher::new(Arc::new(LoggingNotifier)));
    let directory = Arc::new(PassthroughUserDirectory);

    let scheduler = Arc::new(Scheduler::new(
        store.clone(),
        pool.clone(),
        health_gate,
        executor,
        dispatcher,
        directory,
        settings.clone(),
        urls,
    ));

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let scheduler_loop = {
        let scheduler = scheduler.clone();
        tokio::spawn(async move {
            scheduler.run(shutdown_rx).await;
        })
    };

    let health_service = Arc::new(HealthMonitorService::new(pool.clone()));
    let metrics_service = Arc::new(MetricsCollectorService::new(store.clone(), recovery.clone()));
    let availability_checker = Arc::new(AvailabilityChecker::new(pool.clone(), settings.clone()));
    let availability_service = Arc::new(AvailabilityService::new(availability_checker));
    let app = create_monitoring_router(health_service, metrics_service, availability_service).layer(
        TraceLayer::new_for_http()
            .make_span_with(trace::DefaultMakeSpan::new().level(Level::INFO))
            .on_response(trace::DefaultOnResponse::new().level(Level::INFO)),
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], 8080));
    info!(%addr, "serving status endpoints");
    let listener = TcpListener::bind(addr).await.expect("failed to bind status listener");

    tokio::select! {
        result = axum::serve(listener, app) => {
            if let Err(err) = result {
                tracing::error!(%err, "status server exited with an error");
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received");
        }
    }

    let _ = shutdown_tx.send(());
    if let Err(err) = scheduler_loop.await {
        tracing::error!(%err, "scheduler task panicked");
    }

    pool.stop().await.ok();
}
