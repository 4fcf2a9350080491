use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::features::incident_reports::handlers;
use crate::features::incident_reports::services::{IntakeService, ListingService};

/// Shared state for the report handlers
#[derive(Clone)]
pub struct ReportState {
    pub intake: Arc<IntakeService>,
    pub listing: Arc<ListingService>,
}

/// Create routes for the incident reports feature, JSON API and HTML pages
pub fn routes(state: ReportState) -> Router {
    Router::new()
        .route(
            "/api/reports",
            post(handlers::submit_report).get(handlers::list_reports),
        )
        .route("/api/reports/stream", get(handlers::stream_reports))
        .route("/", get(handlers::report_form_page))
        .route("/reports", get(handlers::reports_page))
        .route("/reports/new", post(handlers::submit_report_form))
        .route("/reports/stream", get(handlers::stream_reports_page))
        .route("/reports/{id}/photo", get(handlers::report_photo))
        .with_state(state)
}
