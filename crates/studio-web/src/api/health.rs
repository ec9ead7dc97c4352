use axum::extract::State;
use axum::Json;
use studio_core::search::HealthStatus;

use crate::dto::{HealthResponse, SearchHealthDto};
use crate::state::AppState;

/// Reports liveness plus the state of the search engine.
///
/// Always answers 200; a down or red cluster only marks the report degraded.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let endpoint = state.search.endpoint();
    let endpoint = format!("{}://{}:{}", endpoint.scheme, endpoint.host, endpoint.port);

    let search = match state.search.health().await {
        Ok(health) => SearchHealthDto {
            reachable: true,
            endpoint,
            cluster_name: Some(health.cluster_name),
            status: Some(health.status),
        },
        Err(e) => {
            tracing::warn!("Search health check failed: {e}");
            SearchHealthDto {
                reachable: false,
                endpoint,
                cluster_name: None,
                status: None,
            }
        }
    };

    let status = match (search.reachable, search.status) {
        (true, Some(HealthStatus::Green | HealthStatus::Yellow)) => "ok",
        _ => "degraded",
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        search,
    })
}
