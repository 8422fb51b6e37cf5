//! Shared test transports.

#![allow(dead_code)]

use async_trait::async_trait;
use bungie_netreq::transport::{HttpRequest, HttpResponse, Transport};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

/// In-memory transport that replays scripted responses and records every call.
///
/// When the script runs down to its last response, that response is repeated.
/// Each body gets a `"call"` field with the 1-based call number so distinct
/// network round trips are distinguishable.
pub struct ScriptedTransport {
    script: Mutex<VecDeque<(u16, serde_json::Value)>>,
    calls: Mutex<Vec<(Instant, HttpRequest)>>,
    latency: Duration,
}

impl ScriptedTransport {
    pub fn sequence(script: Vec<(u16, serde_json::Value)>) -> Arc<Self> {
        assert!(!script.is_empty(), "script needs at least one response");
        Arc::new(Self {
            script: Mutex::new(script.into()),
            calls: Mutex::new(Vec::new()),
            latency: Duration::ZERO,
        })
    }

    pub fn always(status: u16) -> Arc<Self> {
        Self::sequence(vec![(status, serde_json::json!({}))])
    }

    pub fn always_with(status: u16, body: serde_json::Value) -> Arc<Self> {
        Self::sequence(vec![(status, body)])
    }

    pub fn with_latency(script: Vec<(u16, serde_json::Value)>, latency: Duration) -> Arc<Self> {
        assert!(!script.is_empty(), "script needs at least one response");
        Arc::new(Self {
            script: Mutex::new(script.into()),
            calls: Mutex::new(Vec::new()),
            latency,
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, r)| r.clone())
            .collect()
    }

    /// Time between consecutive calls.
    pub fn gaps(&self) -> Vec<Duration> {
        let calls = self.calls.lock().unwrap();
        calls
            .windows(2)
            .map(|w| w[1].0.duration_since(w[0].0))
            .collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: &HttpRequest) -> bungie_netreq::Result<HttpResponse> {
        let call_number = {
            let mut calls = self.calls.lock().unwrap();
            calls.push((Instant::now(), request.clone()));
            calls.len()
        };
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let (status, mut body) = {
            let mut script = self.script.lock().unwrap();
            if script.len() > 1 {
                script.pop_front().unwrap()
            } else {
                script.front().cloned().unwrap()
            }
        };
        if let Some(obj) = body.as_object_mut() {
            obj.insert("call".into(), call_number.into());
        }
        Ok(HttpResponse::new(status, body.to_string()))
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// Assert `actual` equals `expected` up to timer granularity.
pub fn assert_close(actual: Duration, expected: Duration) {
    assert!(
        actual >= expected && actual < expected + Duration::from_millis(5),
        "expected ~{:?}, got {:?}",
        expected,
        actual
    );
}
