use crate::cache::{CacheConfig, ResponseCache};
use crate::config::{HttpConfig, NetreqConfig};
use crate::resilience::{RetryConfig, RetryPolicy};
use crate::transport::{HttpTransport, Transport};
use crate::Result;
use std::sync::Arc;
use tracing::info;

use super::executor::RequestExecutor;

/// Builder for [`RequestExecutor`].
///
/// Keep this surface area small and predictable: a config, optionally a
/// transport, optionally a cache to share with other executors.
pub struct RequestExecutorBuilder {
    config: NetreqConfig,
    transport: Option<Arc<dyn Transport>>,
    cache: Option<Arc<ResponseCache>>,
}

impl RequestExecutorBuilder {
    pub fn new() -> Self {
        Self {
            config: NetreqConfig::default(),
            transport: None,
            cache: None,
        }
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: NetreqConfig) -> Self {
        self.config = config;
        self
    }

    pub fn cache_config(mut self, cache: CacheConfig) -> Self {
        self.config.cache = cache;
        self
    }

    pub fn retry_config(mut self, retry: RetryConfig) -> Self {
        self.config.retry = retry;
        self
    }

    pub fn http_config(mut self, http: HttpConfig) -> Self {
        self.config.http = http;
        self
    }

    /// Inject a transport. Defaults to [`HttpTransport`] built from `http_config`.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Use an existing cache instead of creating one from `cache_config`.
    ///
    /// `cache.max_entries` and `cache.ttl_secs` are then taken from that cache.
    pub fn shared_cache(mut self, cache: Arc<ResponseCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn build(self) -> Result<RequestExecutor> {
        self.config.validate()?;

        let transport = match self.transport {
            Some(t) => t,
            None => Arc::new(HttpTransport::new(&self.config.http)?),
        };
        let cache = self
            .cache
            .unwrap_or_else(|| Arc::new(ResponseCache::new(&self.config.cache)));

        info!(
            transport = transport.name(),
            cache_capacity = cache.capacity(),
            cache_ttl_secs = cache.ttl().as_secs(),
            max_retries = self.config.retry.max_retries,
            backoff_multiplier = self.config.retry.backoff_multiplier,
            "request executor ready"
        );

        Ok(RequestExecutor {
            transport,
            cache,
            policy: RetryPolicy::new(self.config.retry),
            store_error_responses: self.config.cache.store_error_responses,
        })
    }
}

impl Default for RequestExecutorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
