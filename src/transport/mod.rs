//! 传输层：请求/响应值类型与单次 HTTP 调用能力。
//!
//! # Transport Module
//!
//! Everything the request layer knows about the network lives behind the
//! [`Transport`] trait: one call in, one [`HttpResponse`] out. Retrying and
//! caching are layered on top by [`crate::client::RequestExecutor`], so a
//! transport never sleeps, never retries and never remembers anything.
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`HttpRequest`] | URL, lower-cased header map and a [`RequestKind`] |
//! | [`HttpResponse`] | Status, headers and the raw body bytes |
//! | [`Transport`] | The "perform one HTTP call" seam |
//! | [`HttpTransport`] | `reqwest`-backed production implementation |

mod http;
mod request;
mod response;

pub use http::HttpTransport;
pub use request::{Headers, HttpRequest, Method, RequestKind};
pub use response::HttpResponse;

use crate::Result;
use async_trait::async_trait;

/// Performs exactly one HTTP round trip.
///
/// Implementations must return `Ok` for every response the server produced,
/// whatever its status. `Err` is reserved for calls that never yielded a
/// response (connection refused, timeout, malformed header).
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse>;

    fn name(&self) -> &'static str {
        "custom"
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid header '{name}': {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("Transport error: {0}")]
    Other(String),
}
