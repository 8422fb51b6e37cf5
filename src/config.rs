//! Request-layer configuration.
//!
//! Defaults match the bot's historical constants (200 entries, 300 s lifetime,
//! 10 retries, multiplier 1.0). Values can come from YAML and be overridden
//! from the environment:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `NETREQ_CACHE_MAX_ENTRIES` | `cache.max_entries` |
//! | `NETREQ_CACHE_TTL_SECS` | `cache.ttl_secs` |
//! | `NETREQ_CACHE_STORE_ERRORS` | `cache.store_error_responses` |
//! | `NETREQ_MAX_RETRIES` | `retry.max_retries` |
//! | `NETREQ_BACKOFF_MULTIPLIER` | `retry.backoff_multiplier` |
//! | `NETREQ_HTTP_TIMEOUT_SECS` | `http.timeout_secs` |
//! | `NETREQ_HTTP_POOL_MAX_IDLE_PER_HOST` | `http.pool_max_idle_per_host` |
//! | `NETREQ_HTTP_POOL_IDLE_TIMEOUT_SECS` | `http.pool_idle_timeout_secs` |
//! | `NETREQ_PROXY_URL` | `http.proxy_url` |
//! | `NETREQ_USER_AGENT` | `http.user_agent` |
//!
//! Unparsable environment values are ignored with a warning.

use crate::cache::CacheConfig;
use crate::resilience::RetryConfig;
use crate::{Error, ErrorContext, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub pool_max_idle_per_host: usize,
    pub pool_idle_timeout_secs: u64,
    pub proxy_url: Option<String>,
    pub user_agent: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            pool_max_idle_per_host: 32,
            pool_idle_timeout_secs: 90,
            proxy_url: None,
            user_agent: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetreqConfig {
    pub cache: CacheConfig,
    pub retry: RetryConfig,
    pub http: HttpConfig,
}

impl NetreqConfig {
    /// Defaults with `NETREQ_*` overrides applied.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml).map_err(|e| {
            Error::configuration_with_context(
                "Failed to parse request-layer configuration",
                ErrorContext::new()
                    .with_details(e.to_string())
                    .with_source("config_loader"),
            )
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&raw).map_err(|e| match e {
            Error::Configuration { message, context } if context.field_path.is_none() => {
                Error::Configuration {
                    message,
                    context: context.with_field_path(path.as_ref().display().to_string()),
                }
            }
            other => other,
        })
    }

    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|name| std::env::var(name).ok())
    }

    pub(crate) fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        override_parsed(&lookup, "NETREQ_CACHE_MAX_ENTRIES", &mut self.cache.max_entries);
        override_parsed(&lookup, "NETREQ_CACHE_TTL_SECS", &mut self.cache.ttl_secs);
        override_parsed(
            &lookup,
            "NETREQ_CACHE_STORE_ERRORS",
            &mut self.cache.store_error_responses,
        );
        override_parsed(&lookup, "NETREQ_MAX_RETRIES", &mut self.retry.max_retries);
        override_parsed(
            &lookup,
            "NETREQ_BACKOFF_MULTIPLIER",
            &mut self.retry.backoff_multiplier,
        );
        override_parsed(&lookup, "NETREQ_HTTP_TIMEOUT_SECS", &mut self.http.timeout_secs);
        override_parsed(
            &lookup,
            "NETREQ_HTTP_POOL_MAX_IDLE_PER_HOST",
            &mut self.http.pool_max_idle_per_host,
        );
        override_parsed(
            &lookup,
            "NETREQ_HTTP_POOL_IDLE_TIMEOUT_SECS",
            &mut self.http.pool_idle_timeout_secs,
        );
        if let Some(proxy) = lookup("NETREQ_PROXY_URL").filter(|s| !s.trim().is_empty()) {
            self.http.proxy_url = Some(proxy);
        }
        if let Some(agent) = lookup("NETREQ_USER_AGENT").filter(|s| !s.trim().is_empty()) {
            self.http.user_agent = Some(agent);
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.cache.max_entries == 0 {
            return Err(invalid("cache.max_entries", "must be at least 1"));
        }
        if !self.retry.backoff_multiplier.is_finite() || self.retry.backoff_multiplier < 0.0 {
            return Err(invalid(
                "retry.backoff_multiplier",
                format!(
                    "must be a finite, non-negative number (got {})",
                    self.retry.backoff_multiplier
                ),
            ));
        }
        let longest_backoff =
            1.0 + f64::from(self.retry.max_retries) * self.retry.backoff_multiplier;
        if Duration::try_from_secs_f64(longest_backoff).is_err() {
            return Err(invalid(
                "retry.backoff_multiplier",
                format!(
                    "backoff after {} retries is out of range (multiplier {})",
                    self.retry.max_retries, self.retry.backoff_multiplier
                ),
            ));
        }
        if self.retry.throttle_field.trim().is_empty() {
            return Err(invalid("retry.throttle_field", "must not be empty"));
        }
        if self.http.timeout_secs == 0 {
            return Err(invalid("http.timeout_secs", "must be at least 1"));
        }
        Ok(())
    }
}

fn invalid(field: &str, details: impl Into<String>) -> Error {
    Error::configuration_with_context(
        "Invalid request-layer configuration",
        ErrorContext::new()
            .with_field_path(field)
            .with_details(details)
            .with_source("config_validator"),
    )
}

fn override_parsed<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    slot: &mut T,
) {
    if let Some(raw) = lookup(name) {
        match raw.trim().parse::<T>() {
            Ok(value) => *slot = value,
            Err(_) => warn!(variable = name, value = %raw, "ignoring unparsable override"),
        }
    }
}
