use axum::{routing::get, Router};

use crate::features::educational_content::handlers;

/// Create routes for the educational content feature
pub fn routes() -> Router {
    Router::new().route("/api/educational-content", get(handlers::list_articles))
}
