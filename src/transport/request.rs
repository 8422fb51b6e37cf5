//! Outbound request description.

use crate::{Error, ErrorContext, Result};
use serde::Serialize;
use std::collections::BTreeMap;

/// Header map keyed by lower-cased header name.
pub type Headers = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What gets sent, and how the body is encoded.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestKind {
    Get,
    /// POST without a body.
    Post,
    PostJson(serde_json::Value),
    PostForm(BTreeMap<String, String>),
}

impl RequestKind {
    pub fn method(&self) -> Method {
        match self {
            RequestKind::Get => Method::Get,
            RequestKind::Post | RequestKind::PostJson(_) | RequestKind::PostForm(_) => Method::Post,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    url: String,
    headers: Headers,
    kind: RequestKind,
}

impl HttpRequest {
    pub fn new(kind: RequestKind, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: Headers::new(),
            kind,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(RequestKind::Get, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(RequestKind::Post, url)
    }

    pub fn post_json(url: impl Into<String>, body: serde_json::Value) -> Self {
        Self::new(RequestKind::PostJson(body), url)
    }

    pub fn post_form<K, V>(url: impl Into<String>, fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let form = fields
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self::new(RequestKind::PostForm(form), url)
    }

    /// Build a request from the flat `(is_get, url, headers, json, form)` call shape.
    ///
    /// A GET never carries a body, and a POST carries at most one of the two
    /// encodings; anything else is a validation error.
    pub fn from_parts<I, K, V>(
        is_get: bool,
        url: impl Into<String>,
        headers: I,
        json: Option<serde_json::Value>,
        form: Option<BTreeMap<String, String>>,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let kind = match (is_get, json, form) {
            (true, None, None) => RequestKind::Get,
            (true, _, _) => {
                return Err(Error::validation_with_context(
                    "GET requests cannot carry a body",
                    ErrorContext::new()
                        .with_field_path("request.body")
                        .with_source("request_builder"),
                ))
            }
            (false, Some(_), Some(_)) => {
                return Err(Error::validation_with_context(
                    "POST requests carry either a JSON body or a form body, not both",
                    ErrorContext::new()
                        .with_field_path("request.body")
                        .with_source("request_builder"),
                ))
            }
            (false, Some(json), None) => RequestKind::PostJson(json),
            (false, None, Some(form)) => RequestKind::PostForm(form),
            (false, None, None) => RequestKind::Post,
        };
        Ok(Self::new(kind, url).with_headers(headers))
    }

    /// Set a header. Names are case-insensitive and stored lower-cased; a
    /// later value for the same name replaces the earlier one.
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        for (name, value) in headers {
            self = self.with_header(name, value);
        }
        self
    }

    pub fn with_bearer(self, token: impl AsRef<str>) -> Self {
        let value = format!("Bearer {}", token.as_ref());
        self.with_header("authorization", value)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn kind(&self) -> &RequestKind {
        &self.kind
    }

    pub fn method(&self) -> Method {
        self.kind.method()
    }
}
