//! Credence HTTP server library.
//!
//! The binary wires the core pipeline to an Axum router; everything testable
//! lives here.

pub mod api;
pub mod stub;

pub use api::{create_router_with_state, AppState};
pub use stub::StubModelGateway;
