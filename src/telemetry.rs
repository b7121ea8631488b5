use std::{sync::Arc, time::Duration};

use axum::http::{HeaderName, Request, Response};
use tower_http::trace::{MakeSpan, OnResponse};
use tracing::Span;

use crate::config::{AppConfig, LogFormat};

pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

pub fn init_tracing(config: &AppConfig) {
    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "student_api=info,tower_http=info".to_string());

    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(env_filter).init(),
    }
}

/// Span for one inbound request. Must sit inside `SetRequestIdLayer` so the
/// correlation id is already on the request.
#[derive(Clone)]
pub struct RequestSpan {
    service: Arc<str>,
}

impl RequestSpan {
    pub fn new(service: &str) -> Self {
        Self {
            service: Arc::from(service),
        }
    }
}

impl<B> MakeSpan<B> for RequestSpan {
    fn make_span(&mut self, req: &Request<B>) -> Span {
        let request_id = req
            .headers()
            .get(&REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-");
        tracing::info_span!(
            "http_request",
            service = %self.service,
            request_id = %request_id,
            method = %req.method(),
            path = %req.uri().path(),
            status = tracing::field::Empty,
        )
    }
}

fn duration_ms(latency: Duration) -> u64 {
    u64::try_from(latency.as_millis()).unwrap_or(u64::MAX)
}

/// Emits the single per-request log record once the response is produced.
#[derive(Clone, Copy, Default)]
pub struct LogResponse;

impl<B> OnResponse<B> for LogResponse {
    fn on_response(self, res: &Response<B>, latency: Duration, span: &Span) {
        let status = res.status();
        span.record("status", status.as_u16());
        let duration_ms = duration_ms(latency);
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), duration_ms, "request completed");
        } else {
            tracing::info!(status = status.as_u16(), duration_ms, "request completed");
        }
    }
}
