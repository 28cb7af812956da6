//! Access log built on `TraceLayer`: one span per request carrying the
//! request id and peer address, a line when the request starts and one when
//! it completes.

use std::{fmt, net::SocketAddr, time::Duration};

use axum::{
    extract::ConnectInfo,
    http::{Request, Response, StatusCode},
};
use tower_http::{
    classify::{ServerErrorsAsFailures, SharedClassifier},
    trace::{MakeSpan, OnRequest, OnResponse, TraceLayer},
};
use tracing::{error, info, info_span, Span};

use super::request_id::RequestId;

pub type AccessLogLayer =
    TraceLayer<SharedClassifier<ServerErrorsAsFailures>, RequestSpan, RequestStarted, RequestCompleted>;

pub fn log_request() -> AccessLogLayer {
    TraceLayer::new_for_http()
        .make_span_with(RequestSpan)
        .on_request(RequestStarted)
        .on_response(RequestCompleted)
}

/// Status the response went out with. Axum hands the logger a finished
/// `Response`, so its status is the one the client sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapturedStatus(StatusCode);

impl CapturedStatus {
    pub fn code(&self) -> StatusCode {
        self.0
    }
}

impl<B> From<&Response<B>> for CapturedStatus {
    fn from(res: &Response<B>) -> Self {
        Self(res.status())
    }
}

impl fmt::Display for CapturedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = self.code();
        write!(
            f,
            "{} {}",
            code.as_u16(),
            code.canonical_reason().unwrap_or("")
        )
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RequestSpan;

impl<B> MakeSpan<B> for RequestSpan {
    fn make_span(&mut self, req: &Request<B>) -> Span {
        let request_id = req
            .extensions()
            .get::<RequestId>()
            .map(|id| id.0.as_str())
            .unwrap_or("-");
        let remote_addr = req
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.to_string())
            .unwrap_or_else(|| "-".into());
        info_span!(
            "http_request",
            method = %req.method(),
            uri = %req.uri(),
            %remote_addr,
            %request_id
        )
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RequestStarted;

impl<B> OnRequest<B> for RequestStarted {
    fn on_request(&mut self, req: &Request<B>, _span: &Span) {
        info!("started {} {}", req.method(), req.uri());
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RequestCompleted;

impl<B> OnResponse<B> for RequestCompleted {
    fn on_response(self, res: &Response<B>, latency: Duration, _span: &Span) {
        let status = CapturedStatus::from(res);
        if status.code().is_server_error() {
            error!("completed with {status} in {latency:?}");
        } else {
            info!("completed with {status} in {latency:?}");
        }
    }
}
