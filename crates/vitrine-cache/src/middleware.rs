//! HTTP caching middleware for ETag and Cache-Control headers.
//!
//! Filter summaries change at most once per job run, so storefront
//! clients and CDNs may hold them briefly and revalidate with
//! `If-None-Match` afterwards.
//!
//! # Example
//!
//! ```ignore
//! use vitrine_cache::middleware::{CacheControlConfig, cache_control, etag_middleware};
//! use axum::{Router, middleware};
//!
//! let app = Router::new()
//!     .route("/store/custom/products/filter-metadata", get(handler))
//!     .layer(middleware::from_fn(etag_middleware))
//!     .layer(cache_control(CacheControlConfig::public(60)));
//! ```

use axum::{
    body::Body,
    extract::Request,
    http::{
        HeaderMap, HeaderValue, Method, StatusCode,
        header::{CACHE_CONTROL, CONTENT_LENGTH, CONTENT_TYPE, ETAG, IF_NONE_MATCH},
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use http_body_util::BodyExt;
use sha2::{Digest, Sha256};
use tower_http::set_header::SetResponseHeaderLayer;

/// Configuration for the Cache-Control header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheControlConfig {
    /// Whether shared caches (CDNs, proxies) may store the response.
    pub public: bool,
    pub max_age: u64,
    pub no_store: bool,
    pub stale_while_revalidate: Option<u64>,
}

impl CacheControlConfig {
    pub fn public(max_age: u64) -> Self {
        Self {
            public: true,
            max_age,
            no_store: false,
            stale_while_revalidate: None,
        }
    }

    pub fn no_store() -> Self {
        Self {
            public: false,
            max_age: 0,
            no_store: true,
            stale_while_revalidate: None,
        }
    }

    pub fn with_stale_while_revalidate(mut self, seconds: u64) -> Self {
        self.stale_while_revalidate = Some(seconds);
        self
    }

    pub fn to_header_value(&self) -> HeaderValue {
        if self.no_store {
            return HeaderValue::from_static("no-store");
        }

        let mut directives = vec![
            if self.public { "public" } else { "private" }.to_string(),
            format!("max-age={}", self.max_age),
        ];
        if let Some(swr) = self.stale_while_revalidate {
            directives.push(format!("stale-while-revalidate={swr}"));
        }

        HeaderValue::from_str(&directives.join(", "))
            .unwrap_or_else(|_| HeaderValue::from_static("no-store"))
    }
}

/// Fixed header value for [`SetResponseHeaderLayer`].
#[derive(Clone)]
pub struct CacheControlMakeHeader(HeaderValue);

impl<B> tower_http::set_header::MakeHeaderValue<Response<B>> for CacheControlMakeHeader {
    fn make_header_value(&mut self, _message: &Response<B>) -> Option<HeaderValue> {
        Some(self.0.clone())
    }
}

/// Sets Cache-Control on responses that don't already carry one.
pub fn cache_control(config: CacheControlConfig) -> SetResponseHeaderLayer<CacheControlMakeHeader> {
    SetResponseHeaderLayer::if_not_present(
        CACHE_CONTROL,
        CacheControlMakeHeader(config.to_header_value()),
    )
}

/// Strong ETag: the first 16 bytes of the body's SHA-256, hex encoded.
fn generate_etag(body: &[u8]) -> String {
    let hash = Sha256::digest(body);
    format!("\"{}\"", hex::encode(&hash[..16]))
}

/// Weak comparison, as If-None-Match requires.
fn etags_match(client_etag: &str, server_etag: &str) -> bool {
    let client = client_etag.trim().trim_start_matches("W/");
    let server = server_etag.trim().trim_start_matches("W/");
    client == "*" || client == server
}

fn not_modified(headers: &HeaderMap) -> Response {
    let mut response = StatusCode::NOT_MODIFIED.into_response();
    for (name, value) in headers {
        if name != CONTENT_LENGTH && name != CONTENT_TYPE {
            response.headers_mut().append(name, value.clone());
        }
    }
    response
}

/// ETag middleware for conditional GET requests.
///
/// Buffers successful GET/HEAD bodies, tags them, and answers `304 Not
/// Modified` when `If-None-Match` names the same tag. The 304 keeps the
/// original response headers other than the body's length and type.
pub async fn etag_middleware(request: Request, next: Next) -> Response {
    let conditional = matches!(*request.method(), Method::GET | Method::HEAD);
    let if_none_match = request
        .headers()
        .get(IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let response = next.run(request).await;

    if !conditional || !response.status().is_success() {
        return response;
    }

    let (mut parts, body) = response.into_parts();

    let bytes = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(_) => return (parts, Body::empty()).into_response(),
    };

    let etag = match parts.headers.get(ETAG).and_then(|v| v.to_str().ok()) {
        Some(existing) => existing.to_string(),
        None => generate_etag(&bytes),
    };
    if let Ok(value) = HeaderValue::from_str(&etag) {
        parts.headers.insert(ETAG, value);
    }

    let matches = if_none_match
        .as_deref()
        .is_some_and(|header| header.split(',').any(|tag| etags_match(tag, &etag)));
    if matches {
        return not_modified(&parts.headers);
    }

    Response::from_parts(parts, Body::from(bytes))
}
