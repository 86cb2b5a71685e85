//! `Cache-Control` header for public, cacheable responses.

use axum::http::{header, HeaderValue};
use tower_http::set_header::SetResponseHeaderLayer;

/// Layer setting `Cache-Control: public, max-age=<seconds>` on every response.
pub fn cache(seconds: u64) -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::overriding(header::CACHE_CONTROL, cache_control_value(seconds))
}

fn cache_control_value(seconds: u64) -> HeaderValue {
    // Always visible ASCII, so the fallback is unreachable in practice
    HeaderValue::from_str(&format!("public, max-age={seconds}"))
        .unwrap_or_else(|_| HeaderValue::from_static("public"))
}
