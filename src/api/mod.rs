#![allow(clippy::needless_for_each)]

use crate::{
    api::handlers::{events, events::__path_events, health, health::__path_health},
    provider::Provider,
};
use anyhow::{Context, Result};
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{HeaderName, HeaderValue, Request},
    routing::{get, post},
    Extension, Router,
};
use std::sync::Arc;
use tokio::{net::TcpListener, signal};
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::{error, info, info_span, warn, Span};
use ulid::Ulid;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub(crate) mod handlers;
mod openapi;

pub use handlers::{ErrorBody, Health};

#[derive(OpenApi)]
#[openapi(
    paths(health, events),
    components(schemas(
        health::Health,
        handlers::ErrorBody,
        crate::provider::Event,
        crate::provider::Response
    )),
    tags(
        (name = "health", description = "Service status"),
        (name = "events", description = "Custom resource lifecycle events")
    )
)]
struct ApiDoc;

/// `OpenAPI` document with package metadata from Cargo.toml.
#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    doc.info = openapi::cargo_info();
    doc
}

/// Build the application router.
pub fn router(provider: Arc<Provider>) -> Router {
    Router::new()
        .route("/events", post(handlers::events))
        .route("/health", get(handlers::health).options(handlers::health))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(Extension(provider)),
        )
}

/// Start the server
/// # Errors
/// Return error if failed to bind or serve
pub async fn serve(port: u16, provider: Arc<Provider>) -> Result<()> {
    let listener = TcpListener::bind(format!("::0:{port}"))
        .await
        .with_context(|| format!("Failed to bind port {port}"))?;

    info!(
        "Listening on [::]:{}, resource types: {:?}",
        port,
        provider.registry()
    );

    axum::serve(listener, router(provider).into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Gracefully shutdown");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                error!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => warn!("Received Ctrl+C, shutting down"),
        () = terminate => warn!("Received terminate signal, shutting down"),
    }
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}
