use std::sync::Arc;

use studio_core::{FileStore, SearchClient, StaticAssetResolver};

use crate::config::ServerConfig;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub assets: Arc<StaticAssetResolver>,
    /// Same store the resolver reads; the cached mount serves from it directly.
    pub store: Arc<dyn FileStore>,
    pub search: SearchClient,
}
