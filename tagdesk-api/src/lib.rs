//! tagdesk-api library
//!
//! Complaint intake service: validation, tagging, persistence and the HTTP
//! surface that composes them.

pub mod api;
pub mod classifier;
pub mod cli;
pub mod db;
pub mod error;
pub mod validation;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::classifier::ComplaintClassifier;
use crate::validation::ValidationRules;

/// Default NEGATIVE score at which a complaint counts as urgent
pub const DEFAULT_URGENT_THRESHOLD: f64 = 0.80;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Tags complaints with category and sentiment
    pub classifier: Arc<dyn ComplaintClassifier>,
    /// Submission rules
    pub rules: Arc<ValidationRules>,
    /// Minimum NEGATIVE score listed by /complaints/urgent
    pub urgent_threshold: f64,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(db: SqlitePool, classifier: Arc<dyn ComplaintClassifier>) -> Self {
        Self {
            db,
            classifier,
            rules: Arc::new(ValidationRules::default()),
            urgent_threshold: DEFAULT_URGENT_THRESHOLD,
            startup_time: Utc::now(),
        }
    }

    pub fn with_rules(mut self, rules: ValidationRules) -> Self {
        self.rules = Arc::new(rules);
        self
    }

    pub fn with_urgent_threshold(mut self, threshold: f64) -> Self {
        self.urgent_threshold = threshold;
        self
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::root_routes())
        .merge(api::health_routes())
        .merge(api::complaint_routes())
        .merge(api::docs_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
