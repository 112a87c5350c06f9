//! Request handlers.
//!
//! Wake requests return the controller's response verbatim (holding page
//! or redirect). Failures return a JSON body and a non-200 status so a
//! broken upstream never masquerades as a holding page. Upstream error
//! detail stays in the logs; the body only carries the error code.

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use tracing::{debug, warn};

use turnip_core::{ServiceRef, WakeError, WakeResult};

use crate::ApiState;

/// Error body, in the same shape the rest of the API uses.
#[derive(serde::Serialize)]
struct ApiError {
    success: bool,
    error: &'static str,
    message: &'static str,
}

fn error_response(e: &WakeError) -> Response {
    let status = StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(ApiError {
            success: false,
            error: e.code(),
            message: public_message(e),
        }),
    )
        .into_response()
}

fn public_message(e: &WakeError) -> &'static str {
    match e {
        WakeError::InvalidRequest(_) => "service and cluster query parameters are required",
        WakeError::UpstreamUnavailable { .. } => "upstream control plane unavailable",
        WakeError::MalformedResponse { .. } => "unexpected upstream response",
    }
}

/// Query parameters of a wake request.
#[derive(Debug, Default, Deserialize)]
pub struct WakeParams {
    pub service: Option<String>,
    pub cluster: Option<String>,
}

impl WakeParams {
    /// Validate both parameters. The service is checked first.
    pub fn into_service_ref(self) -> WakeResult<ServiceRef> {
        let service = non_blank(self.service).ok_or(WakeError::InvalidRequest("invalid_or_null_service"))?;
        let cluster = non_blank(self.cluster).ok_or(WakeError::InvalidRequest("invalid_or_null_cluster"))?;
        Ok(ServiceRef::new(cluster, service))
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// ── Wake ───────────────────────────────────────────────────────

/// GET / and GET /wake
pub async fn wake(State(state): State<ApiState>, Query(params): Query<WakeParams>) -> Response {
    let target = match params.into_service_ref() {
        Ok(target) => target,
        Err(e) => {
            warn!(code = e.code(), "rejected wake request");
            return error_response(&e);
        }
    };

    debug!(%target, "wake request");
    match state.controller.handle(&target).await {
        Ok(resp) => resp.map(Body::from),
        Err(e) => error_response(&e),
    }
}

// ── Health ─────────────────────────────────────────────────────

/// GET /healthz
pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}
