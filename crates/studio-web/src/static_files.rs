use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use studio_core::{Asset, RequestPath};

use crate::error::AppError;
use crate::state::AppState;

fn asset_response(asset: Asset) -> Response {
    let mime = mime_guess::from_path(asset.path.as_str()).first_or_octet_stream();
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, mime.as_ref())],
        asset.bytes,
    )
        .into_response()
}

/// `GET /` always forwards to the fallback document.
pub async fn index(State(state): State<AppState>) -> Result<Response, AppError> {
    let asset = state.assets.load_fallback().await?;
    Ok(asset_response(asset))
}

/// Catch-all: file if it exists, app shell otherwise, 404 for API namespaces.
pub async fn spa_handler(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Response, AppError> {
    let path = RequestPath::parse(&raw)?;

    match state.assets.load(&path).await? {
        Some(asset) => {
            if asset.fallback {
                tracing::debug!("SPA fallback for /{path}");
            }
            Ok(asset_response(asset))
        }
        None => Err(AppError::NotFound(format!("No static resource {path}"))),
    }
}

/// Cached mount (`/static/**` by default): direct files only, no SPA fallback.
pub async fn mounted_asset(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Response, AppError> {
    let path = RequestPath::parse(&raw)?;

    if path.is_root() || !state.store.is_readable(&path).await? {
        return Err(AppError::NotFound(format!("No static resource {path}")));
    }

    let asset = state.store.open(&path).await?;
    Ok(asset_response(asset))
}
