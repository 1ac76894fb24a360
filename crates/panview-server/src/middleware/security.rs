//! Response headers set on every route.
//!
//! There is no Content-Security-Policy: compiled pages pull MathJax and the
//! markdown stylesheet from a CDN and embed the autorefresh script inline.

use axum::http::HeaderValue;
use axum::http::header::HeaderName;
use tower_http::set_header::SetResponseHeaderLayer;

const NOSNIFF: (&str, &str) = ("x-content-type-options", "nosniff");
/// `inline` fragments may be framed by pages from the same host.
const SAME_ORIGIN_FRAMES: (&str, &str) = ("x-frame-options", "SAMEORIGIN");

fn overriding((name, value): (&'static str, &'static str)) -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::overriding(
        HeaderName::from_static(name),
        HeaderValue::from_static(value),
    )
}

/// Disable MIME sniffing, so static assets keep their guessed type.
pub(crate) fn content_type_options_layer() -> SetResponseHeaderLayer<HeaderValue> {
    overriding(NOSNIFF)
}

/// Only allow framing from the same origin.
pub(crate) fn frame_options_layer() -> SetResponseHeaderLayer<HeaderValue> {
    overriding(SAME_ORIGIN_FRAMES)
}
