//! HTTP API layer for komuna.
//!
//! This crate provides the REST API and the realtime change stream:
//!
//! - **Endpoints**: public submission/tracking/statistics and the
//!   privileged admin dashboard API
//! - **Extractors**: admin authentication
//! - **Middleware**: bearer-token authentication
//! - **SSE**: server-sent report change events
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;
pub mod sse;

pub use endpoints::{not_found, router};
pub use sse::{ReportBroadcaster, ReportEvent};
