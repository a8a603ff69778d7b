//! HTTP API server for the cards client
//!
//! This module provides a REST API over the application context:
//! - GET /states, GET/POST /region - Region search and selection
//! - GET/POST /cards/offline, GET /cards/:id/share - Offline cache and sharing
//! - GET/POST /contacts, DELETE /contacts/:id - Emergency contacts
//! - POST /alerts - Send an emergency alert
//! - GET/PUT /preferences - User preferences
//! - POST /recording/{start,pause,resume,stop}, GET /recording/status
//! - GET /recordings - Archived encounter records
//! - GET /health - Health check

mod error;
mod handlers;
mod routes;
mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
