use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::AppState;
use crate::constants::API_VERSION;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub rpc: String,
}

/// Liveness probe. Reports RPC reachability without failing the endpoint:
/// the service itself is up even when the upstream node is not.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let rpc = match state.chain.health().await {
        Ok(()) => "reachable",
        Err(err) => {
            tracing::warn!("health rpc check failed err={}", err);
            "unreachable"
        }
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        version: API_VERSION.to_string(),
        rpc: rpc.to_string(),
    })
}
