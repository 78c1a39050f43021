//! HTTP request handlers for the dashboard API.

pub mod catalog;
pub mod compare;
pub mod data;
pub mod explore;
pub mod health;
pub mod reports;
pub mod zones;

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use storage::Download;

/// `image/png` body.
pub fn png_response(png: Bytes) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("image/png")),
            (header::CACHE_CONTROL, HeaderValue::from_static("max-age=3600")),
        ],
        Body::from(png),
    )
        .into_response()
}

/// File bytes as an attachment download.
pub fn download_response(download: Download) -> Response {
    let disposition = HeaderValue::from_str(&download.content_disposition())
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(download.content_type)),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        Body::from(download.bytes),
    )
        .into_response()
}
