//! `GET /refresh/{*name}`: autorefresh polling.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use serde::Deserialize;

use crate::error::ServerError;
use crate::handlers::parse_variant;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub(crate) struct RefreshQuery {
    /// Page load time in Unix seconds. Non-integer values are ignored.
    time: Option<String>,
    fmt: Option<String>,
}

/// Answer `True` if the page for `name` should be reloaded, `False` otherwise.
pub(crate) async fn refresh(
    Path(name): Path<String>,
    Query(query): Query<RefreshQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<&'static str, ServerError> {
    let variant = parse_variant(query.fmt.as_deref())?;
    let since = query.time.as_deref().and_then(|t| t.trim().parse::<u64>().ok());

    let stale = state.context.is_stale(&name, variant, since)?;
    Ok(if stale { "True" } else { "False" })
}
