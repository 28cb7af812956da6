//! Request pipeline. Applied outermost first:
//! request id → access log → CORS → (private routes only) authentication.

use axum::http::{header, Method};
use tower_http::cors::{Any, CorsLayer};

mod auth;
mod logging;
mod request_id;

pub use auth::{authenticate_user, CurrentUser};
pub use logging::log_request;
pub use request_id::set_request_id;
#[cfg(test)]
pub use request_id::REQUEST_ID_HEADER;

/// Any origin, no credentials.
pub fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::HEAD, Method::POST])
        .allow_headers([
            header::ACCEPT,
            header::ACCEPT_LANGUAGE,
            header::CONTENT_LANGUAGE,
            header::CONTENT_TYPE,
            header::ORIGIN,
        ])
}
