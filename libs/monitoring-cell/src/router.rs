use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;

use crate::handlers::{get_availability, get_health, get_metrics, MonitoringHandlers};
use crate::services::{AvailabilityService, HealthMonitorService, MetricsCollectorService};

/// Unauthenticated status surface: operators can curl `/health`, `/metrics`
/// and `/availability` directly, the same way the dispatcher's own health
/// gate reads pool state. No alerts, no admin routes — nothing here mutates
/// anything.
pub fn create_monitoring_router(
    health_service: Arc<HealthMonitorService>,
    metrics_service: Arc<MetricsCollectorService>,
    availability_service: Arc<AvailabilityService>,
) -> Router {
    let handlers = Arc::new(MonitoringHandlers::new(health_service, metrics_service, availability_service));

    Router::new()
        .route("/health", get(get_health))
        .route("/metrics", get(get_metrics))
        .route("/availability", get(get_availability))
        .layer(CorsLayer::permissive())
        .with_state(handlers)
}
