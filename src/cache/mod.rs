//! 响应缓存模块：按请求内容定位、有容量上限并按时间失效的缓存。
//!
//! # Response Caching Module
//!
//! Reply building issues bursts of near-identical lookups (the same manifest
//! definition fetched for every item on a character). This module keeps the
//! recent responses around so those bursts hit memory instead of the API.
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`RequestKey`] | Order-independent digest of method, URL, headers and body |
//! | [`ResponseCache`] | Bounded LRU store with lazy TTL expiry and statistics |
//! | [`CacheConfig`] | Capacity, lifetime and error-response policy |
//! | [`CacheStats`] | Hit / miss / expiry / insert / eviction counters |
//!
//! ## Example
//!
//! ```rust
//! use bungie_netreq::cache::{CacheConfig, RequestKey, ResponseCache};
//! use bungie_netreq::transport::{HttpRequest, HttpResponse};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let cache = ResponseCache::new(
//!     &CacheConfig::new()
//!         .with_max_entries(200)
//!         .with_ttl(Duration::from_secs(300)),
//! );
//!
//! let request = HttpRequest::get("https://www.bungie.net/Platform/Destiny2/Milestones/");
//! let key = RequestKey::from_request(&request);
//! cache.insert(key.clone(), Arc::new(HttpResponse::new(200, "{}")));
//! assert!(cache.lookup(&key).is_some());
//! # }
//! ```
//!
//! ## Expiry
//!
//! Entries are not swept in the background. A lookup that finds an entry
//! older than the TTL removes it and reports a miss.

mod key;
mod store;

pub use key::RequestKey;
pub use store::{CacheConfig, CacheStats, ResponseCache};
