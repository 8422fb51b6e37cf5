use super::{Headers, HttpRequest, HttpResponse, RequestKind, Transport, TransportError};
use crate::config::HttpConfig;
use crate::Result;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Proxy;
use std::time::Duration;
use tracing::warn;

/// Production transport backed by a pooled `reqwest::Client`.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .pool_idle_timeout(Some(Duration::from_secs(config.pool_idle_timeout_secs)));

        if let Some(agent) = &config.user_agent {
            builder = builder.user_agent(agent.as_str());
        }

        if let Some(proxy_url) = &config.proxy_url {
            match Proxy::all(proxy_url) {
                Ok(proxy) => builder = builder.proxy(proxy),
                Err(e) => warn!(proxy = %proxy_url, error = %e, "ignoring unusable proxy url"),
            }
        }

        let client = builder
            .build()
            .map_err(|e| crate::Error::Transport(TransportError::Other(e.to_string())))?;

        Ok(Self { client })
    }

    /// Wrap an already configured client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    fn header_map(headers: &Headers) -> std::result::Result<HeaderMap, TransportError> {
        let mut map = HeaderMap::with_capacity(headers.len());
        for (name, value) in headers {
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                TransportError::InvalidHeader {
                    name: name.clone(),
                    reason: e.to_string(),
                }
            })?;
            let header_value =
                HeaderValue::from_str(value).map_err(|e| TransportError::InvalidHeader {
                    name: name.clone(),
                    reason: e.to_string(),
                })?;
            map.insert(header_name, header_value);
        }
        Ok(map)
    }

    /// Values that are not visible ASCII are skipped. Repeated names are joined.
    fn response_from_parts(status: u16, headers: &HeaderMap, body: Bytes) -> HttpResponse {
        headers
            .iter()
            .filter_map(|(name, value)| Some((name.as_str(), value.to_str().ok()?)))
            .fold(HttpResponse::new(status, body), |r, (name, value)| {
                r.append_header(name, value)
            })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let url = request.url();
        // Headers go in first so an explicit content-type is not overridden by the body encoder.
        let headers = Self::header_map(request.headers())?;
        let builder = match request.kind() {
            RequestKind::Get => self.client.get(url).headers(headers),
            RequestKind::Post => self.client.post(url).headers(headers),
            RequestKind::PostJson(body) => self.client.post(url).headers(headers).json(body),
            RequestKind::PostForm(form) => self.client.post(url).headers(headers).form(form),
        };

        let resp = builder.send().await.map_err(TransportError::Http)?;

        let status = resp.status().as_u16();
        let headers = resp.headers().clone();
        let body = resp.bytes().await.map_err(TransportError::Http)?;
        Ok(Self::response_from_parts(status, &headers, body))
    }

    fn name(&self) -> &'static str {
        "reqwest"
    }
}
