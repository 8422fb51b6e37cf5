//! 请求执行器：缓存查找、网络调用与服务端错误重试。
//!
//! Request execution: cache lookup, network call, server-error retry.

use crate::cache::{RequestKey, ResponseCache};
use crate::resilience::{Decision, RetryPolicy};
use crate::transport::{HttpRequest, HttpResponse, Transport};
use crate::Result;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use super::builder::RequestExecutorBuilder;

/// Shared entry point for every outbound call the bot makes.
///
/// Cloning is cheap; clones share the transport and the cache.
#[derive(Clone)]
pub struct RequestExecutor {
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) cache: Arc<ResponseCache>,
    pub(crate) policy: RetryPolicy,
    pub(crate) store_error_responses: bool,
}

impl RequestExecutor {
    pub fn builder() -> RequestExecutorBuilder {
        RequestExecutorBuilder::new()
    }

    /// Return the response for `request`, from the cache when allowed.
    ///
    /// With `use_cache` set, a fresh cached response is returned without any
    /// network traffic, and a network response is stored afterwards. Server
    /// errors are retried per the [`RetryPolicy`]; once retries run out the
    /// last response is returned as-is, so callers must check the status.
    ///
    /// `Err` only comes from the transport (no response at all).
    pub async fn execute(&self, use_cache: bool, request: &HttpRequest) -> Result<Arc<HttpResponse>> {
        let key = use_cache.then(|| RequestKey::from_request(request));

        if let Some(key) = &key {
            if let Some(cached) = self.cache.lookup(key) {
                return Ok(cached);
            }
        }

        let response = Arc::new(self.send_with_retry(request).await?);

        if let Some(key) = key {
            if response.is_success() || self.store_error_responses {
                self.cache.insert(key, Arc::clone(&response));
            } else {
                debug!(
                    url = %request.url(),
                    status = response.status(),
                    "not caching error response"
                );
            }
        }

        Ok(response)
    }

    /// Flat form of [`execute`](Self::execute) for call sites that carry the
    /// request as loose parts.
    pub async fn execute_parts<I, K, V>(
        &self,
        use_cache: bool,
        is_get: bool,
        url: &str,
        headers: I,
        json: Option<serde_json::Value>,
        form: Option<BTreeMap<String, String>>,
    ) -> Result<Arc<HttpResponse>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let request = HttpRequest::from_parts(is_get, url, headers, json, form)?;
        self.execute(use_cache, &request).await
    }

    /// No cache lock is held while sending or sleeping.
    async fn send_with_retry(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let request_id = Uuid::new_v4().to_string();
        let mut attempt: u32 = 0;

        loop {
            let response = self.transport.send(request).await?;

            match self.policy.decide(&response, attempt) {
                Decision::Done => {
                    if response.is_server_error() && attempt > 0 {
                        warn!(
                            request_id = %request_id,
                            method = %request.method(),
                            url = %request.url(),
                            status = response.status(),
                            retries = attempt,
                            "server error persisted after retries"
                        );
                    }
                    return Ok(response);
                }
                Decision::Retry { delay } => {
                    warn!(
                        request_id = %request_id,
                        method = %request.method(),
                        url = %request.url(),
                        status = response.status(),
                        attempt = attempt + 1,
                        max_retries = self.policy.max_retries(),
                        delay_ms = delay.as_millis() as u64,
                        "server error, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    pub fn cache(&self) -> &Arc<ResponseCache> {
        &self.cache
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn transport_name(&self) -> &'static str {
        self.transport.name()
    }
}

impl std::fmt::Debug for RequestExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestExecutor")
            .field("transport", &self.transport.name())
            .field("cache_len", &self.cache.len())
            .field("policy", &self.policy)
            .field("store_error_responses", &self.store_error_responses)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheConfig;
    use crate::resilience::RetryConfig;
    use crate::transport::TransportError;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays canned statuses; repeats the last one when the script runs out.
    struct Scripted {
        statuses: Mutex<VecDeque<u16>>,
        calls: Mutex<u32>,
    }

    impl Scripted {
        fn new(statuses: &[u16]) -> Arc<Self> {
            Arc::new(Self {
                statuses: Mutex::new(statuses.iter().copied().collect()),
                calls: Mutex::new(0),
            })
        }

        fn calls(&self) -> u32 {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl Transport for Scripted {
        async fn send(&self, _request: &HttpRequest) -> Result<HttpResponse> {
            *self.calls.lock().unwrap() += 1;
            let mut statuses = self.statuses.lock().unwrap();
            let status = if statuses.len() > 1 {
                statuses.pop_front().unwrap()
            } else {
                *statuses.front().unwrap()
            };
            Ok(HttpResponse::new(status, format!("{{\"status\": {}}}", status)))
        }
    }

    struct Unreachable;

    #[async_trait]
    impl Transport for Unreachable {
        async fn send(&self, _request: &HttpRequest) -> Result<HttpResponse> {
            Err(TransportError::Other("connection refused".into()).into())
        }
    }

    fn executor(transport: Arc<dyn Transport>, store_errors: bool) -> RequestExecutor {
        RequestExecutor::builder()
            .transport(transport)
            .cache_config(CacheConfig::new().with_store_error_responses(store_errors))
            .retry_config(RetryConfig::new().with_max_retries(2))
            .build()
            .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_after_transient_error() {
        let transport = Scripted::new(&[503, 200]);
        let exec = executor(transport.clone(), true);
        let resp = exec
            .execute(false, &HttpRequest::get("https://example.com"))
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_responses_skip_cache_when_disabled() {
        let transport = Scripted::new(&[503]);
        let exec = executor(transport.clone(), false);
        let req = HttpRequest::get("https://example.com");
        let resp = exec.execute(true, &req).await.unwrap();
        assert_eq!(resp.status(), 503);
        assert_eq!(transport.calls(), 3);
        assert!(exec.cache().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_responses_are_cached_by_default() {
        let transport = Scripted::new(&[404]);
        let exec = executor(transport.clone(), true);
        let req = HttpRequest::get("https://example.com");
        exec.execute(true, &req).await.unwrap();
        let again = exec.execute(true, &req).await.unwrap();
        assert_eq!(again.status(), 404);
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_transport_failure_propagates() {
        let exec = executor(Arc::new(Unreachable), true);
        let err = exec
            .execute(true, &HttpRequest::get("https://example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, crate::Error::Transport(_)));
        assert!(exec.cache().is_empty());
    }

    #[tokio::test]
    async fn test_execute_parts_validates_shape() {
        let transport = Scripted::new(&[200]);
        let exec = executor(transport.clone(), true);
        let err = exec
            .execute_parts(
                false,
                true,
                "https://example.com",
                [("x-api-key", "k")],
                Some(serde_json::json!({})),
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, crate::Error::Validation { .. }));
        assert_eq!(transport.calls(), 0);
    }

    #[test]
    fn test_debug_does_not_need_transport_debug() {
        let exec = executor(Scripted::new(&[200]), true);
        let rendered = format!("{:?}", exec);
        assert!(rendered.contains("RequestExecutor"));
        assert!(rendered.contains("custom"));
    }
}
