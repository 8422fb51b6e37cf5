//! # bungie-netreq
//!
//! Cached, retrying HTTP request layer for the Robin Destiny 2 bot.
//!
//! ## Overview
//!
//! Building a single chat reply fans out into many API calls, most of them
//! repeats (the same manifest definition for every item on a character). All
//! of them go through one [`RequestExecutor`], which
//!
//! - serves cache-eligible requests from a bounded LRU cache with a fixed
//!   lifetime per entry,
//! - retries 5xx responses, honouring the server's `ThrottleSeconds` hint and
//!   falling back to linear backoff,
//! - returns the final response as-is, so callers decide what a persistent
//!   error status means.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bungie_netreq::{HttpRequest, RequestExecutor};
//!
//! #[tokio::main]
//! async fn main() -> bungie_netreq::Result<()> {
//!     let executor = RequestExecutor::builder().build()?;
//!
//!     let request = HttpRequest::get(
//!         "https://www.bungie.net/Platform/Destiny2/Manifest/DestinyActivityDefinition/1/",
//!     )
//!     .with_header("X-API-Key", "your-api-key");
//!
//!     // First call hits the network, the second is served from memory.
//!     let first = executor.execute(true, &request).await?;
//!     let second = executor.execute(true, &request).await?;
//!     assert_eq!(first.status(), second.status());
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | [`RequestExecutor`] and its builder |
//! | [`cache`] | Request keys and the LRU response cache |
//! | [`resilience`] | Server-error retry policy |
//! | [`transport`] | Request/response types and the HTTP seam |
//! | [`config`] | Tunables, YAML loading and environment overrides |
//! | [`platform`] | Typed helpers for the game platform API |

pub mod cache;
pub mod client;
pub mod config;
pub mod platform;
pub mod resilience;
pub mod transport;

// Re-export main types for convenience
pub use cache::{CacheConfig, CacheStats, RequestKey, ResponseCache};
pub use client::{RequestExecutor, RequestExecutorBuilder};
pub use config::{HttpConfig, NetreqConfig};
pub use resilience::{RetryConfig, RetryPolicy};
pub use transport::{HttpRequest, HttpResponse, RequestKind, Transport};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
