use std::sync::Arc;

use axum::{extract::State, Json};

use crate::models::{AvailabilityResponse, HealthResponse, MetricsResponse};
use crate::services::{AvailabilityService, HealthMonitorService, MetricsCollectorService};

pub struct MonitoringHandlers {
    health_service: Arc<HealthMonitorService>,
    metrics_service: Arc<MetricsCollectorService>,
    availability_service: Arc<AvailabilityService>,
}

impl MonitoringHandlers {
    pub fn new(
        health_service: Arc<HealthMonitorService>,
        metrics_service: Arc<MetricsCollectorService>,
        availability_service: Arc<AvailabilityService>,
    ) -> Self {
        Self { health_service, metrics_service, availability_service }
    }
}

pub async fn get_health(State(handlers): State<Arc<MonitoringHandlers>>) -> Json<HealthResponse> {
    Json(handlers.health_service.check().await)
}

pub async fn get_metrics(State(handlers): State<Arc<MonitoringHandlers>>) -> Json<MetricsResponse> {
    Json(handlers.metrics_service.snapshot().await)
}

pub async fn get_availability(State(handlers): State<Arc<MonitoringHandlers>>) -> Json<AvailabilityResponse> {
    Json(handlers.availability_service.snapshot().await)
}
