//! HTTP surface for image resolution.
//!
//! ## Routes
//!
//! - `GET /compounds/:inchi_key/image` returns the image bytes with their
//!   `Content-Type`, or 404 when no image could be resolved.
//! - `GET /health` returns `{ "status": "ok" }`.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tracing::{info, warn};

use crate::application::ImageResolver;

/// Builds the router.
pub fn router(resolver: Arc<ImageResolver>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/compounds/:inchi_key/image", get(image_handler))
        .with_state(resolver)
}

/// Serves until Ctrl-C.
///
/// # Errors
/// Returns error if the address cannot be bound.
pub async fn serve(resolver: Arc<ImageResolver>, addr: SocketAddr) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "Listening");
    axum::serve(listener, router(resolver))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

async fn health_handler() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn image_handler(
    State(resolver): State<Arc<ImageResolver>>,
    Path(inchi_key): Path<String>,
) -> Response {
    let started = Instant::now();
    info!(key = %inchi_key, "Image request started");

    let response = match resolver.image(&inchi_key).await {
        Some(resolved) => {
            let mut response = Response::new(Body::from(resolved.image.bytes));
            if !resolved.image.mime_type.is_empty() {
                match HeaderValue::from_str(&resolved.image.mime_type) {
                    Ok(value) => {
                        response.headers_mut().insert(header::CONTENT_TYPE, value);
                    }
                    Err(_) => {
                        warn!(mime_type = %resolved.image.mime_type, "Dropping invalid content type");
                    }
                }
            }
            response
        }
        None => StatusCode::NOT_FOUND.into_response(),
    };

    info!(
        key = %inchi_key,
        status = response.status().as_u16(),
        elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        "Image request finished"
    );
    response
}
