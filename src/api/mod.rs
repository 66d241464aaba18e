//! # HTTP API
//!
//! Axum routing, request handlers, error mapping, OpenAPI docs, and the
//! server entry point.

pub mod docs;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;

pub use error::ApiError;
pub use routes::{build_router, ApiState};
pub use server::start_api_server;
