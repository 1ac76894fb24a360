//! `GET /generated/{file}`: rendered diagram images.

use std::io;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};

use crate::error::ServerError;
use crate::state::AppState;

pub(crate) async fn generated(
    Path(file): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ServerError> {
    let path = state
        .context
        .diagrams()
        .image_path(&file)
        .ok_or_else(|| ServerError::NotFound(file.clone()))?;

    let image = match tokio::fs::read(&path).await {
        Ok(image) => image,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(ServerError::NotFound(file)),
        Err(e) => return Err(e.into()),
    };
    Ok(([(header::CONTENT_TYPE, "image/png")], image).into_response())
}
