use std::future::Future;
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use super::capture::{decode_text, CapturedBody};
use super::sink::LogSink;
use super::snapshot::{RequestSnapshot, ResponseSnapshot};
use crate::{config::LoggingConfig, error::CaptureError, metrics, AppState};

/// Logs the request line and the response body of every request passing through.
pub async fn body_logging_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let settings = state.config.read().await.logging.clone();

    if !settings.enabled {
        return next.run(request).await;
    }

    BodyLogger::new(settings, state.sink.clone())
        .intercept(request, |request| next.run(request))
        .await
}

/// Captures request and response bodies for one request at a time.
pub struct BodyLogger {
    settings: LoggingConfig,
    sink: Arc<dyn LogSink>,
}

impl BodyLogger {
    pub fn new(settings: LoggingConfig, sink: Arc<dyn LogSink>) -> Self {
        Self { settings, sink }
    }

    /// Logs the request, runs `next` once, logs the response body and hands
    /// the response back with its head untouched and its body replayed byte
    /// for byte.
    pub async fn intercept<F, Fut>(&self, request: Request, next: F) -> Response
    where
        F: FnOnce(Request) -> Fut,
        Fut: Future<Output = Response>,
    {
        let (request, snapshot) = self.capture_request(request).await;
        self.sink.info(&snapshot.to_string());
        metrics::record_request();

        let response = next(request).await;

        if !self.settings.include_response_body {
            return response;
        }

        self.capture_response(response).await
    }

    async fn capture_request(&self, request: Request) -> (Request, RequestSnapshot) {
        let (parts, body) = request.into_parts();
        let declared = declared_length(&parts.headers);
        let scheme = self.settings.default_scheme.as_str();

        if !self.settings.include_request_body || declared == Some(0) {
            let snapshot = RequestSnapshot::from_parts(&parts, scheme, String::new());
            return (Request::from_parts(parts, body), snapshot);
        }

        // Without a declared length, read until the stream ends.
        let limit = declared.map_or(self.settings.max_body_bytes, |len| {
            len.min(self.settings.max_body_bytes)
        });
        let mut captured = CapturedBody::read(body, limit).await;

        if let Some(err) = truncation(declared, &captured) {
            warn!(path = parts.uri.path(), error = %err, "Logging truncated request body");
            metrics::record_truncated_request();
        }

        let text = match captured.buffer_mut().read_prefix(limit) {
            Ok(raw) => decode_text(&raw),
            Err(e) => {
                warn!(error = %CaptureError::from(e), "Failed to read captured request body");
                String::new()
            }
        };

        let snapshot = RequestSnapshot::from_parts(&parts, scheme, text);
        (Request::from_parts(parts, captured.into_body()), snapshot)
    }

    async fn capture_response(&self, response: Response) -> Response {
        let (parts, body) = response.into_parts();
        let mut captured = CapturedBody::read(body, self.settings.max_body_bytes).await;

        if let Some(err) = captured.error() {
            let err = CaptureError::Downstream {
                received: captured.buffer().len(),
                reason: err.to_string(),
            };
            warn!(status = parts.status.as_u16(), error = %err, "Skipping response log");
            metrics::record_response_failure();
        } else {
            match captured.buffer_mut().read_prefix(self.settings.max_body_bytes) {
                Ok(raw) => {
                    metrics::record_captured_response_bytes(captured.buffer().len());
                    let snapshot = ResponseSnapshot {
                        body: decode_text(&raw),
                    };
                    self.sink.info(&snapshot.to_string());
                }
                Err(e) => {
                    warn!(error = %CaptureError::from(e), "Skipping response log");
                }
            }
        }

        Response::from_parts(parts, captured.into_body())
    }
}

fn declared_length(headers: &HeaderMap) -> Option<usize> {
    headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

fn truncation(declared: Option<usize>, captured: &CapturedBody) -> Option<CaptureError> {
    let declared = declared?;
    let received = captured.buffer().len();

    if captured.is_partial() || received >= declared {
        return None;
    }

    Some(CaptureError::TruncatedBody { declared, received })
}
