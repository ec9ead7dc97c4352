use serde::Serialize;
use studio_core::search::HealthStatus;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub search: SearchHealthDto,
}

#[derive(Debug, Serialize)]
pub struct SearchHealthDto {
    pub reachable: bool,
    pub endpoint: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<HealthStatus>,
}
