//! 弹性模块：服务端错误重试与退避。
//!
//! # Resilience Module
//!
//! The platform API answers transient overload with 5xx statuses, sometimes
//! with a `ThrottleSeconds` hint in the body. [`RetryPolicy`] turns each
//! response into a [`Decision`]: retry after a delay, or hand the response
//! back as final.
//!
//! ```rust
//! use bungie_netreq::resilience::{Decision, RetryConfig, RetryPolicy};
//! use bungie_netreq::transport::HttpResponse;
//! use std::time::Duration;
//!
//! let policy = RetryPolicy::new(RetryConfig::new().with_max_retries(3));
//! let busy = HttpResponse::new(503, r#"{"ThrottleSeconds": 2}"#);
//! assert_eq!(
//!     policy.decide(&busy, 0),
//!     Decision::Retry { delay: Duration::from_secs(2) }
//! );
//! assert_eq!(policy.decide(&busy, 3), Decision::Done);
//! ```

pub mod retry;

pub use retry::{Decision, RetryConfig, RetryPolicy};
