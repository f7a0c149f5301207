//! Health check endpoints for Kubernetes-style probes.
//!
//! - `/livez` - Basic liveness probe (immediate 200, no checks)
//! - `/healthz` - Reports the active storage backend

use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /livez - Basic liveness probe.
pub async fn livez() -> StatusCode {
    StatusCode::OK
}

/// GET /healthz - Liveness plus the name of the active backend.
///
/// Does not query the store.
pub async fn healthz(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "backend": state.backend_name(),
    }))
}
