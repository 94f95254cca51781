//! Shared fixtures: a scripted in-process transport and config helpers.

#![allow(dead_code)]

use async_trait::async_trait;
use flashcards_ai::transport::{Transport, TransportError, TransportRequest, TransportResponse};
use flashcards_ai::ServiceConfig;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// What the transport does on one call.
#[derive(Debug, Clone)]
pub enum Step {
    Respond(TransportResponse),
    /// Connection-level failure (not a timeout).
    Fail(String),
    /// Transport-reported timeout.
    TimedOut,
    /// Never completes within any sane deadline.
    Hang,
}

impl Step {
    pub fn json(status: u16, body: Value) -> Self {
        Step::Respond(TransportResponse::new(status, body.to_string()))
    }

    pub fn raw(status: u16, body: &str) -> Self {
        Step::Respond(TransportResponse::new(status, body))
    }

    pub fn with_header(self, name: &str, value: &str) -> Self {
        match self {
            Step::Respond(resp) => Step::Respond(resp.with_header(name, value)),
            other => other,
        }
    }
}

/// Plays back a script of steps; the last step repeats forever.
pub struct ScriptedTransport {
    steps: Mutex<VecDeque<Step>>,
    calls: AtomicUsize,
    requests: Mutex<Vec<TransportRequest>>,
}

impl ScriptedTransport {
    pub fn new(steps: Vec<Step>) -> Self {
        assert!(!steps.is_empty(), "script needs at least one step");
        Self {
            steps: Mutex::new(steps.into()),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn always(step: Step) -> Self {
        Self::new(vec![step])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn next_step(&self) -> Step {
        let mut steps = self.steps.lock().unwrap();
        if steps.len() > 1 {
            steps.pop_front().unwrap()
        } else {
            steps.front().cloned().unwrap()
        }
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn post_json(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request);
        match self.next_step() {
            Step::Respond(resp) => Ok(resp),
            Step::Fail(msg) => Err(TransportError::Other(msg)),
            Step::TimedOut => Err(TransportError::Timeout),
            Step::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(TransportError::Other("hang elapsed".into()))
            }
        }
    }
}

/// `{apiKey:"k", defaultModel:"m", timeout:5000, maxRetries:2}`
pub fn config() -> ServiceConfig {
    ServiceConfig::new("k", "m")
        .with_request_timeout(Duration::from_millis(5000))
        .with_max_retries(2)
}

pub fn completion_body(id: &str, model: &str, content: &str) -> Value {
    json!({
        "id": id,
        "model": model,
        "choices": [{"message": {"role": "assistant", "content": content}}]
    })
}

pub fn completion_with_usage(content: &str) -> Value {
    let mut body = completion_body("gen-1", "m", content);
    body["usage"] = json!({
        "prompt_tokens": 12,
        "completion_tokens": 8,
        "total_tokens": 20,
        "cost": 0.0004
    });
    body
}
