//! Usage telemetry: best-effort token accounting after successful calls.
//!
//! Tracking is application-controlled. The client only ever hands a
//! [`UsageEvent`] to an injected [`UsageSink`] on a detached task; a sink
//! failure is logged as a warning and never reaches the caller.
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`UsageEvent`] | Token counts and cost for one completion |
//! | [`UsageSink`] | Trait for usage destinations |
//! | [`NoopUsageSink`] | Discards everything |
//! | [`InMemoryUsageSink`] | Bounded in-memory sink for testing |
//! | [`TracingUsageSink`] | Emits each event as a `tracing` record |

use crate::types::{CompletionResult, Usage};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::{Arc, RwLock};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageEvent {
    pub user_id: Option<String>,
    pub model: String,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
    pub cost: Option<f64>,
    pub request_id: Option<String>,
}

impl UsageEvent {
    pub fn new(result: &CompletionResult, usage: &Usage, user_id: Option<&str>) -> Self {
        Self {
            user_id: user_id.map(str::to_string),
            model: result.model.clone(),
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
            total_tokens: usage.total_tokens,
            cost: usage.cost,
            request_id: result.request_id.clone(),
        }
    }
}

/// Destination for usage events.
#[async_trait]
pub trait UsageSink: Send + Sync {
    async fn record(&self, event: UsageEvent) -> anyhow::Result<()>;
}

pub struct NoopUsageSink;

#[async_trait]
impl UsageSink for NoopUsageSink {
    async fn record(&self, _event: UsageEvent) -> anyhow::Result<()> {
        Ok(())
    }
}

/// In-memory sink for testing.
pub struct InMemoryUsageSink {
    events: RwLock<Vec<UsageEvent>>,
    max_events: usize,
}

impl InMemoryUsageSink {
    pub fn new(max: usize) -> Self {
        Self {
            events: RwLock::new(Vec::new()),
            max_events: max,
        }
    }

    pub fn events(&self) -> Vec<UsageEvent> {
        match self.events.read() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.events().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryUsageSink {
    fn default() -> Self {
        Self::new(1_000)
    }
}

#[async_trait]
impl UsageSink for InMemoryUsageSink {
    async fn record(&self, event: UsageEvent) -> anyhow::Result<()> {
        let mut events = self
            .events
            .write()
            .map_err(|_| anyhow::anyhow!("usage buffer lock poisoned"))?;
        events.push(event);
        if events.len() > self.max_events {
            events.remove(0);
        }
        Ok(())
    }
}

/// Logs each event at `info` with a masked user id.
pub struct TracingUsageSink;

#[async_trait]
impl UsageSink for TracingUsageSink {
    async fn record(&self, event: UsageEvent) -> anyhow::Result<()> {
        info!(
            model = %event.model,
            prompt_tokens = event.prompt_tokens,
            completion_tokens = event.completion_tokens,
            total_tokens = event.total_tokens,
            cost = ?event.cost,
            request_id = ?event.request_id,
            user = ?event.user_id.as_deref().map(mask_user_id),
            "OpenRouter usage recorded"
        );
        Ok(())
    }
}

/// Hands `event` to `sink` on a detached task.
///
/// Never awaited by the caller; errors are logged and dropped. Outside a
/// tokio runtime the event is dropped with a warning.
pub fn dispatch_usage(sink: Arc<dyn UsageSink>, event: UsageEvent) {
    let handle = match tokio::runtime::Handle::try_current() {
        Ok(handle) => handle,
        Err(_) => {
            warn!(model = %event.model, "no async runtime; usage event dropped");
            return;
        }
    };
    handle.spawn(async move {
        let model = event.model.clone();
        let request_id = event.request_id.clone();
        if let Err(e) = sink.record(event).await {
            warn!(
                model = %model,
                request_id = ?request_id,
                error = %e,
                "OpenRouter usage tracking failed"
            );
        }
    });
}

/// Masks a user id for logs: `abc***yz`, or `***` for ids of six chars or fewer.
pub fn mask_user_id(user_id: &str) -> String {
    let chars: Vec<char> = user_id.chars().collect();
    if chars.len() <= 6 {
        return "***".to_string();
    }
    let head: String = chars[..3].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{}***{}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn event(model: &str) -> UsageEvent {
        UsageEvent {
            user_id: Some("user-123456".into()),
            model: model.into(),
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
            cost: None,
            request_id: None,
        }
    }

    #[test]
    fn masks_user_ids() {
        assert_eq!(mask_user_id("abc"), "***");
        assert_eq!(mask_user_id("abcdef"), "***");
        assert_eq!(mask_user_id("abcdefg"), "abc***fg");
        assert_eq!(mask_user_id("user-123456"), "use***56");
    }

    #[tokio::test]
    async fn in_memory_sink_is_bounded() {
        let sink = InMemoryUsageSink::new(2);
        for m in ["a", "b", "c"] {
            sink.record(event(m)).await.unwrap();
        }
        let models: Vec<String> = sink.events().into_iter().map(|e| e.model).collect();
        assert_eq!(models, vec!["b", "c"]);
    }

    struct FailingSink;

    #[async_trait]
    impl UsageSink for FailingSink {
        async fn record(&self, _event: UsageEvent) -> anyhow::Result<()> {
            anyhow::bail!("store unavailable")
        }
    }

    #[tokio::test]
    async fn dispatch_swallows_sink_errors() {
        dispatch_usage(Arc::new(FailingSink), event("m"));
        let sink = Arc::new(InMemoryUsageSink::default());
        dispatch_usage(sink.clone(), event("m"));
        for _ in 0..100 {
            if !sink.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn dispatch_outside_runtime_is_noop() {
        dispatch_usage(Arc::new(NoopUsageSink), event("m"));
    }
}
