//! Request key derivation.

use crate::transport::{HttpRequest, RequestKind};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Cache slot identifier for a request.
///
/// The digest covers method, URL, the sorted header set and a canonical
/// rendering of the body, so requests that differ only in how their headers
/// or JSON objects were assembled map to the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestKey {
    pub hash: String,
    pub url: String,
}

impl RequestKey {
    pub fn from_request(request: &HttpRequest) -> Self {
        let (body_kind, body) = match request.kind() {
            RequestKind::Get => ("none", Value::Null),
            RequestKind::Post => ("empty", Value::Null),
            RequestKind::PostJson(json) => ("json", json.clone()),
            RequestKind::PostForm(form) => (
                "form",
                Value::Array(
                    form.iter()
                        .map(|(k, v)| Value::Array(vec![k.as_str().into(), v.as_str().into()]))
                        .collect(),
                ),
            ),
        };
        // Headers are already a sorted, lower-cased map.
        let headers = Value::Array(
            request
                .headers()
                .iter()
                .map(|(k, v)| Value::Array(vec![k.as_str().into(), v.as_str().into()]))
                .collect(),
        );
        let document = Value::Array(vec![
            request.method().as_str().into(),
            request.url().into(),
            headers,
            body_kind.into(),
            body,
        ]);

        let mut canonical = String::new();
        write_canonical(&document, &mut canonical);

        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        let hash: String = hasher
            .finalize()
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect();
        Self {
            hash,
            url: request.url().to_string(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.hash
    }

    /// First 12 hex chars, for log lines.
    pub fn short(&self) -> &str {
        &self.hash[..self.hash.len().min(12)]
    }
}

impl std::fmt::Display for RequestKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.hash)
    }
}

impl From<&HttpRequest> for RequestKey {
    fn from(request: &HttpRequest) -> Self {
        Self::from_request(request)
    }
}

/// Compact JSON with object keys sorted at every depth, independent of
/// whether `serde_json` was built with `preserve_order`.
fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            out.push('{');
            for (i, (k, v)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::from(k.as_str()).to_string());
                out.push(':');
                write_canonical(v, out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}
