//! Front-end asset serving.
//!
//! Only the files listed in `ASSET_ROUTES` are reachable. The on-disk name
//! comes from this table, never from the request path, so nothing outside the
//! configured static directory can be read.

use std::io;

use axum::{
    extract::State,
    http::{header, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};

use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug)]
pub struct Asset {
    pub file: &'static str,
    pub content_type: &'static str,
}

static INDEX_HTML: Asset = Asset {
    file: "index.html",
    content_type: "text/html; charset=utf-8",
};

static STYLE_CSS: Asset = Asset {
    file: "style.css",
    content_type: "text/css; charset=utf-8",
};

static APP_JS: Asset = Asset {
    file: "app.js",
    content_type: "text/javascript; charset=utf-8",
};

static CAMERA_JS: Asset = Asset {
    file: "camera.js",
    content_type: "text/javascript; charset=utf-8",
};

pub static ASSET_ROUTES: [(&str, &Asset); 5] = [
    ("/", &INDEX_HTML),
    ("/index.html", &INDEX_HTML),
    ("/style.css", &STYLE_CSS),
    ("/app.js", &APP_JS),
    ("/camera.js", &CAMERA_JS),
];

pub fn asset_router() -> Router<AppState> {
    ASSET_ROUTES
        .iter()
        .fold(Router::new(), |router, &(path, asset)| {
            router.route(
                path,
                get(move |State(state): State<AppState>| async move {
                    serve_asset(&state, asset).await
                }),
            )
        })
}

/// Reads `asset` from the static directory on every request.
pub async fn serve_asset(state: &AppState, asset: &Asset) -> Result<Response, AppError> {
    let path = state.config.static_dir.join(asset.file);
    let bytes = tokio::fs::read(&path).await.map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => AppError::NotFound(asset.file.to_string()),
        _ => AppError::Internal(e),
    })?;

    Ok(([(header::CONTENT_TYPE, asset.content_type)], bytes).into_response())
}

/// Fallback for every path the router does not know.
pub async fn handle_not_found(uri: Uri) -> AppError {
    AppError::NotFound(uri.path().to_string())
}
