use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use serde::Deserialize;
use studio_core::assets::{DEFAULT_EXCLUSION_PREFIXES, DEFAULT_FALLBACK_DOCUMENT};
use studio_core::SearchSettings;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,
    #[serde(default)]
    pub assets: AssetsConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub search: SearchSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssetsConfig {
    #[serde(default = "default_document_root")]
    pub document_root: PathBuf,
    #[serde(default = "default_fallback_document")]
    pub fallback_document: String,
    #[serde(default = "default_exclusion_prefixes")]
    pub exclusion_prefixes: Vec<String>,
    /// URL prefix of the cached direct-file route.
    #[serde(default = "default_static_mount")]
    pub static_mount: String,
    #[serde(default = "default_max_age_secs")]
    pub static_cache_max_age_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
    #[serde(default = "default_allowed_methods")]
    pub allowed_methods: Vec<String>,
    #[serde(default = "default_allowed_headers")]
    pub allowed_headers: Vec<String>,
    #[serde(default = "default_true")]
    pub allow_credentials: bool,
    #[serde(default = "default_max_age_secs")]
    pub max_age_secs: u64,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            document_root: default_document_root(),
            fallback_document: default_fallback_document(),
            exclusion_prefixes: default_exclusion_prefixes(),
            static_mount: default_static_mount(),
            static_cache_max_age_secs: default_max_age_secs(),
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: default_allowed_origins(),
            allowed_methods: default_allowed_methods(),
            allowed_headers: default_allowed_headers(),
            allow_credentials: true,
            max_age_secs: default_max_age_secs(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            assets: AssetsConfig::default(),
            cors: CorsConfig::default(),
            search: SearchSettings::default(),
        }
    }
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

fn default_document_root() -> PathBuf {
    PathBuf::from("static")
}

fn default_fallback_document() -> String {
    DEFAULT_FALLBACK_DOCUMENT.to_string()
}

fn default_exclusion_prefixes() -> Vec<String> {
    DEFAULT_EXCLUSION_PREFIXES.iter().map(|p| p.to_string()).collect()
}

fn default_static_mount() -> String {
    "/static".to_string()
}

fn default_max_age_secs() -> u64 {
    3600
}

fn default_true() -> bool {
    true
}

fn default_allowed_origins() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_allowed_methods() -> Vec<String> {
    ["GET", "POST", "PUT", "DELETE", "OPTIONS"]
        .iter()
        .map(|m| m.to_string())
        .collect()
}

fn default_allowed_headers() -> Vec<String> {
    [
        "X-AGENTSCOPE-WORKSPACE",
        "Authorization",
        "Content-Type",
        "X-Requested-With",
        "Accept",
        "Origin",
        "Access-Control-Request-Method",
        "Access-Control-Request-Headers",
    ]
    .iter()
    .map(|h| h.to_string())
    .collect()
}

impl ServerConfig {
    pub fn load() -> anyhow::Result<Self> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// Loads the TOML file named by `STUDIO_CONFIG` (defaults when unset),
    /// then applies `STUDIO_*` overrides read through `env`.
    pub fn load_with(env: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut config = match env("STUDIO_CONFIG") {
            Some(path) => {
                let contents = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read config file {path}"))?;
                toml::from_str(&contents)
                    .with_context(|| format!("Failed to parse config file {path}"))?
            }
            None => ServerConfig::default(),
        };

        if let Some(addr) = env("STUDIO_BIND_ADDR") {
            config.bind_addr = addr
                .parse()
                .with_context(|| format!("Invalid STUDIO_BIND_ADDR: {addr}"))?;
        }
        if let Some(root) = env("STUDIO_DOCUMENT_ROOT") {
            config.assets.document_root = PathBuf::from(root);
        }
        if let Some(url) = env("STUDIO_SEARCH_URL") {
            config.search.url = url;
        }
        if let Some(username) = env("STUDIO_SEARCH_USERNAME") {
            config.search.username = username;
        }
        if let Some(password) = env("STUDIO_SEARCH_PASSWORD") {
            config.search.password = Some(password);
        }
        if let Some(val) = env("STUDIO_SEARCH_MAX_CONNECTIONS") {
            config.search.pool.max_connections = val
                .parse()
                .with_context(|| format!("Invalid STUDIO_SEARCH_MAX_CONNECTIONS: {val}"))?;
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        let mount = self.assets.static_mount.trim_end_matches('/');
        if !mount.starts_with('/') || mount.len() < 2 {
            anyhow::bail!(
                "assets.static_mount must be an absolute, non-root path (got {:?})",
                self.assets.static_mount
            );
        }
        if mount.contains(['{', '}', '*']) {
            anyhow::bail!("assets.static_mount must not contain route wildcards");
        }
        if self.assets.fallback_document.trim().is_empty() {
            anyhow::bail!("assets.fallback_document must not be empty");
        }
        if self.cors.allowed_origins.is_empty() {
            tracing::warn!("cors.allowed_origins is empty; cross-origin requests will be refused");
        }
        Ok(())
    }

    /// Route pattern of the cached direct-file mount, e.g. `/static/{*path}`.
    pub fn static_route(&self) -> String {
        format!("{}/{{*path}}", self.assets.static_mount.trim_end_matches('/'))
    }
}
