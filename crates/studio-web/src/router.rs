use axum::http::{header, HeaderValue};
use axum::routing::get;
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{api, cors, static_files};

/// Assembles every route. Route precedence:
///
/// 1. `/` forwards to the fallback document;
/// 2. API routes;
/// 3. the cached static mount;
/// 4. the SPA catch-all.
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    let config = state.config.clone();
    let cors = cors::cors_layer(&config.cors)?;
    let cache_control = HeaderValue::from_str(&format!(
        "max-age={}",
        config.assets.static_cache_max_age_secs
    ))?;

    let static_routes = Router::new()
        .route(&config.static_route(), get(static_files::mounted_asset))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            cache_control,
        ));

    Ok(Router::new()
        .route("/", get(static_files::index))
        .merge(api::router())
        .merge(static_routes)
        .route("/{*path}", get(static_files::spa_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}
