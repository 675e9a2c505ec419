use axum::{
    body::Bytes,
    http::{header, HeaderMap, HeaderValue},
    response::IntoResponse,
};

/// Returns the request body verbatim, keeping its content type.
pub async fn echo(headers: HeaderMap, body: Bytes) -> impl IntoResponse {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static("application/octet-stream"));

    ([(header::CONTENT_TYPE, content_type)], body)
}
