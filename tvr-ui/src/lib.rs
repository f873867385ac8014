//! tvr-ui library - traffic violation reporting web service
//!
//! Session-based registration/login with email verification, violation-record
//! submission and editing, and public search/marker/detail JSON endpoints.

use std::sync::Arc;

use axum::Router;
use sqlx::SqlitePool;

use crate::mailer::Mailer;

pub mod api;
pub mod db;
pub mod error;
pub mod mailer;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Outbound transactional mail transport
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool, mailer: Arc<dyn Mailer>) -> Self {
        Self { db, mailer }
    }
}

/// Build application router
///
/// Public routes cover health, registration/login/verification, and the
/// violation query endpoints. Everything else requires a valid session cookie.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{get, post, put};

    // Protected routes (require a session)
    let protected = Router::new()
        .route("/api/auth/logout", post(api::auth::logout))
        .route("/api/auth/resend", post(api::auth::resend_verification))
        .route(
            "/api/account",
            get(api::account::get_account).delete(api::account::delete_account),
        )
        .route("/api/account/email", post(api::account::change_email))
        .route("/api/account/password", post(api::account::change_password))
        .route("/api/reports", post(api::reports::submit_report))
        .route("/api/reports/mine", get(api::reports::my_reports))
        .route("/api/reports/:id", put(api::reports::update_report))
        .route("/api/reports/:id/media", get(api::reports::report_media))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::session_middleware,
        ));

    // Public routes (no session required)
    let public = Router::new()
        .route("/api/auth/register", post(api::auth::register))
        .route("/api/auth/check", get(api::auth::check_username_email))
        .route("/api/auth/login", post(api::auth::login))
        .route("/api/auth/verify", post(api::auth::verify))
        .route("/api/violations/search", get(api::violations::search))
        .route("/api/violations/markers", get(api::violations::markers))
        .route("/api/violations/:id", get(api::violations::details))
        .merge(api::health_routes());

    // Combine routers
    Router::new()
        .merge(protected)
        .merge(public)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}
