//! CORS policy from [`CorsSettings`].
//!
//! `*` means "any". Browsers refuse `Access-Control-Allow-Origin: *` on
//! credentialed requests, so when credentials are allowed the wildcard
//! lists mirror the request instead.

use axum::http::{HeaderName, HeaderValue, Method};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer};
use tracing::warn;

use crate::config::{CorsSettings, is_wildcard};

pub fn cors_layer(cors: &CorsSettings) -> CorsLayer {
    let credentials = cors.allow_credentials;

    let origins = cors.origins();
    let allow_origin = match (is_wildcard(&origins), credentials) {
        (true, true) => AllowOrigin::mirror_request(),
        (true, false) => AllowOrigin::from(Any),
        (false, _) => AllowOrigin::list(parse_all::<HeaderValue>("origin", &origins)),
    };

    let methods = cors.methods();
    let allow_methods = match (is_wildcard(&methods), credentials) {
        (true, true) => AllowMethods::mirror_request(),
        (true, false) => AllowMethods::from(Any),
        (false, _) => AllowMethods::list(parse_all::<Method>("method", &methods)),
    };

    let headers = cors.headers();
    let allow_headers = match (is_wildcard(&headers), credentials) {
        (true, true) => AllowHeaders::mirror_request(),
        (true, false) => AllowHeaders::from(Any),
        (false, _) => AllowHeaders::list(parse_all::<HeaderName>("header", &headers)),
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(allow_methods)
        .allow_headers(allow_headers)
        .allow_credentials(credentials)
}

fn parse_all<T: std::str::FromStr>(kind: &str, items: &[String]) -> Vec<T> {
    items
        .iter()
        .filter_map(|item| match item.parse::<T>() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(%kind, value = %item, "ignoring unparsable CORS entry");
                None
            }
        })
        .collect()
}
