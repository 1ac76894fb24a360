//! `GET /view/{*name}`: compiled documents and static assets.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use panview_storage::SourceKind;
use serde::Deserialize;

use crate::error::ServerError;
use crate::handlers::parse_variant;
use crate::state::AppState;

const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

#[derive(Debug, Deserialize)]
pub(crate) struct ViewQuery {
    fmt: Option<String>,
}

/// Serve the compiled document for `name`, or the file itself if `name` is
/// not a source document.
pub(crate) async fn view(
    Path(name): Path<String>,
    Query(query): Query<ViewQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ServerError> {
    let variant = parse_variant(query.fmt.as_deref())?;
    let context = &state.context;

    match context.classify(&name)? {
        SourceKind::Compilable => {
            let artifact = context.compile(&name, variant).await?;
            Ok(([(header::CONTENT_TYPE, HTML_CONTENT_TYPE)], artifact.html.to_vec()).into_response())
        }
        SourceKind::StaticAsset => serve_asset(&state, &name).await,
    }
}

async fn serve_asset(state: &AppState, name: &str) -> Result<Response, ServerError> {
    let source = state.context.sources().resolve(name)?;
    let content = tokio::fs::read(&source.path).await?;
    let mime = mime_guess::from_path(&source.path).first_or_octet_stream();
    tracing::debug!(name, mime = %mime, "Serving static file");
    Ok(([(header::CONTENT_TYPE, mime.to_string())], content).into_response())
}
