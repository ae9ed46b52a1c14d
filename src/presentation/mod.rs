//! Presentation layer exposing the resolver over HTTP.

/// Axum router and server.
pub mod http;

pub use http::{router, serve};
