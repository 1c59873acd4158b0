use std::sync::Arc;

use anyhow::Context;
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use daylight_core::{DaylightError, DaylightPayload, DaylightService, ErrorPayload};
use tower_http::trace::TraceLayer;

const UNAVAILABLE_MESSAGE: &str = "Geocoding provider unavailable.";

pub fn router(service: Arc<DaylightService>) -> Router {
    Router::new()
        .route("/api/daylight/{city_name}", get(daylight))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

pub async fn serve(service: DaylightService, addr: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    tracing::info!("listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(Arc::new(service)))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .context("HTTP server failed")
}

async fn healthz() -> &'static str {
    "ok"
}

async fn daylight(
    State(service): State<Arc<DaylightService>>,
    Path(city_name): Path<String>,
) -> Response {
    match service.get_report(&city_name).await {
        Ok(report) => Json(DaylightPayload::from_report(&report)).into_response(),
        Err(DaylightError::CityNotFound(_)) => {
            (StatusCode::NOT_FOUND, Json(ErrorPayload::not_found())).into_response()
        }
        Err(e) => {
            tracing::error!(city = %city_name, error = %e, "daylight report failed");
            let body = Json(ErrorPayload::new(UNAVAILABLE_MESSAGE));
            (StatusCode::BAD_GATEWAY, body).into_response()
        }
    }
}
