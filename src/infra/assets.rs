//! Embedded stylesheet for the panel.

use axum::{
    body::Body,
    http::{HeaderValue, StatusCode, header},
    response::Response,
};

static ADMIN_STYLESHEET: &str = include_str!("../../static/admin/admin.css");

/// Serve the embedded panel stylesheet.
pub async fn serve_admin_stylesheet() -> Response {
    build_response(ADMIN_STYLESHEET, "text/css; charset=utf-8")
}

fn build_response(contents: &'static str, mime: &'static str) -> Response {
    let mut response = Response::new(Body::from(contents));
    *response.status_mut() = StatusCode::OK;

    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(mime));
    if let Ok(value) = HeaderValue::from_str(&contents.len().to_string()) {
        headers.insert(header::CONTENT_LENGTH, value);
    }
    // URLs carry the crate version as `?v=`.
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("public, max-age=31536000, immutable"),
    );

    response
}
