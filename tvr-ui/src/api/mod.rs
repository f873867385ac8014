//! HTTP API handlers for tvr-ui

pub mod account;
pub mod auth;
pub mod health;
pub mod reports;
pub mod session;
pub mod violations;

pub use health::health_routes;
pub use session::session_middleware;
