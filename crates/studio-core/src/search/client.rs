//! Pooled HTTP client for an Elasticsearch-compatible search engine.
//!
//! [`SearchClient::new`] validates everything up front so a bad URL or
//! impossible pool size stops the process at startup instead of surfacing on
//! the first query.

use std::sync::Arc;

use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::sync::Semaphore;

use super::settings::SearchSettings;

/// Errors that can occur while building or using a [`SearchClient`].
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("invalid search URL: {0}")]
    InvalidUrl(String),

    #[error("unsupported search URL scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid search settings: {0}")]
    InvalidSettings(String),

    #[error("invalid index name: {0:?}")]
    InvalidIndex(String),

    #[error("failed to build search client: {0}")]
    Build(#[source] reqwest::Error),

    #[error("search request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("search engine answered {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected search response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("search connection pool closed")]
    PoolClosed,
}

/// Scheme, host and port of the search engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchEndpoint {
    pub scheme: String,
    pub host: String,
    pub port: u16,
}

impl SearchEndpoint {
    /// Extracts the endpoint from `url`. A missing port takes the scheme default.
    pub fn parse(url: &str) -> Result<Self, SearchError> {
        let parsed = Url::parse(url).map_err(|e| SearchError::InvalidUrl(format!("{url}: {e}")))?;

        let scheme = parsed.scheme().to_string();
        if scheme != "http" && scheme != "https" {
            return Err(SearchError::UnsupportedScheme(scheme));
        }

        let host = parsed
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| SearchError::InvalidUrl(format!("{url}: missing host")))?
            .to_string();
        let port = parsed
            .port_or_known_default()
            .ok_or_else(|| SearchError::InvalidUrl(format!("{url}: missing port")))?;

        Ok(Self { scheme, host, port })
    }

    fn base_url(&self) -> Result<Url, SearchError> {
        let raw = format!("{}://{}:{}/", self.scheme, self.host, self.port);
        Url::parse(&raw).map_err(|e| SearchError::InvalidUrl(format!("{raw}: {e}")))
    }
}

/// Answer of `GET /`.
#[derive(Debug, Clone, Deserialize)]
pub struct ClusterInfo {
    pub name: String,
    pub cluster_name: String,
    pub version: VersionInfo,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VersionInfo {
    pub number: String,
}

/// Overall cluster state as reported by `_cluster/health`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Green,
    Yellow,
    Red,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClusterHealth {
    pub cluster_name: String,
    pub status: HealthStatus,
    #[serde(default)]
    pub number_of_nodes: u32,
}

/// One matching document.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchHit<T> {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_score")]
    pub score: Option<f64>,
    #[serde(rename = "_source")]
    pub source: T,
}

/// Result page of a search.
#[derive(Debug, Clone)]
pub struct SearchResults<T> {
    pub total: u64,
    pub hits: Vec<SearchHit<T>>,
}

#[derive(Deserialize)]
struct RawSearchResponse<T> {
    hits: RawHits<T>,
}

#[derive(Deserialize)]
struct RawHits<T> {
    total: Option<RawTotal>,
    hits: Vec<SearchHit<T>>,
}

#[derive(Deserialize)]
struct RawTotal {
    value: u64,
}

/// Typed client over a pooled `reqwest::Client`.
///
/// Cloning is cheap and clones share the pool.
#[derive(Clone)]
pub struct SearchClient {
    http: reqwest::Client,
    endpoint: SearchEndpoint,
    base: Url,
    credentials: Option<(String, String)>,
    permits: Arc<Semaphore>,
}

impl SearchClient {
    /// Builds the client from `settings`.
    ///
    /// # Errors
    ///
    /// - [`SearchError::InvalidUrl`] / [`SearchError::UnsupportedScheme`] for a bad URL.
    /// - [`SearchError::InvalidSettings`] for zero-sized pools.
    /// - [`SearchError::Build`] if the HTTP client cannot be constructed.
    pub fn new(settings: &SearchSettings) -> Result<Self, SearchError> {
        let endpoint = SearchEndpoint::parse(&settings.url)?;
        let base = endpoint.base_url()?;

        if settings.pool.max_connections == 0 {
            return Err(SearchError::InvalidSettings(
                "pool.max_connections must be at least 1".to_string(),
            ));
        }
        if settings.pool.max_connections_per_route == 0 {
            return Err(SearchError::InvalidSettings(
                "pool.max_connections_per_route must be at least 1".to_string(),
            ));
        }

        // Every request targets the one configured endpoint, so the
        // per-route limit bounds concurrency whenever it is the smaller one.
        let max_in_flight = settings
            .pool
            .max_connections
            .min(settings.pool.max_connections_per_route);

        // The socket timeout bounds each wait for data, not the whole exchange.
        let http = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout())
            .read_timeout(settings.socket_timeout())
            .pool_max_idle_per_host(settings.pool.max_connections_per_route)
            .build()
            .map_err(SearchError::Build)?;

        let credentials = settings
            .credentials()
            .map(|(user, pass)| (user.to_string(), pass.to_string()));

        tracing::debug!(
            "Search client configured for {}://{}:{} (auth: {}, max in flight: {})",
            endpoint.scheme,
            endpoint.host,
            endpoint.port,
            credentials.is_some(),
            max_in_flight
        );

        Ok(Self {
            http,
            endpoint,
            base,
            credentials,
            permits: Arc::new(Semaphore::new(max_in_flight)),
        })
    }

    pub fn endpoint(&self) -> &SearchEndpoint {
        &self.endpoint
    }

    pub fn has_credentials(&self) -> bool {
        self.credentials.is_some()
    }

    /// Node and version information (`GET /`).
    pub async fn info(&self) -> Result<ClusterInfo, SearchError> {
        self.call(Method::GET, "", None).await
    }

    /// Cluster health (`GET /_cluster/health`).
    pub async fn health(&self) -> Result<ClusterHealth, SearchError> {
        self.call(Method::GET, "_cluster/health", None).await
    }

    /// Runs `query` against `index` (`POST /{index}/_search`).
    pub async fn search<T: DeserializeOwned>(
        &self,
        index: &str,
        query: &serde_json::Value,
    ) -> Result<SearchResults<T>, SearchError> {
        if index.is_empty()
            || index.starts_with('_')
            || index.contains(['/', '?', '#', ':', ' '])
        {
            return Err(SearchError::InvalidIndex(index.to_string()));
        }

        let raw: RawSearchResponse<T> = self
            .call(Method::POST, &format!("{index}/_search"), Some(query))
            .await?;
        let total = raw
            .hits
            .total
            .map(|t| t.value)
            .unwrap_or(raw.hits.hits.len() as u64);

        Ok(SearchResults {
            total,
            hits: raw.hits.hits,
        })
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<T, SearchError> {
        let url = self
            .base
            .join(path)
            .map_err(|e| SearchError::InvalidUrl(format!("{path}: {e}")))?;

        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| SearchError::PoolClosed)?;

        let mut request = self.http.request(method, url);
        if let Some((user, pass)) = &self.credentials {
            request = request.basic_auth(user, Some(pass));
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            return Err(SearchError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        Ok(serde_json::from_slice(&bytes)?)
    }
}
