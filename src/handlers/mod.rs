pub mod category;
pub mod message;
pub mod topic;
pub mod user;
pub mod view;

use crate::error::AppError;
use axum::{
    http::{header, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
};

/// Fallback for every path no route claims.
///
/// A path that only lacks its trailing slash is redirected to the routed
/// form, with the query string kept: `301` for reads, `308` otherwise so the
/// method and body survive.
pub async fn not_found(method: Method, uri: Uri) -> Response {
    let path = uri.path();
    if !path.ends_with('/') && has_slash_route(path) {
        let location = match uri.query() {
            Some(query) => format!("{path}/?{query}"),
            None => format!("{path}/"),
        };
        let status = if method == Method::GET || method == Method::HEAD {
            StatusCode::MOVED_PERMANENTLY
        } else {
            StatusCode::PERMANENT_REDIRECT
        };
        return (status, [(header::LOCATION, location)]).into_response();
    }

    AppError::NotFound("Page not found".to_string()).into_response()
}

/// Whether `path` plus a trailing slash is one of the routed shapes.
fn has_slash_route(path: &str) -> bool {
    let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return false;
    }
    matches!(
        segments.as_slice(),
        ["t"] | ["nt"] | ["c"] | ["t", _, _] | ["u", _, _]
    )
}
