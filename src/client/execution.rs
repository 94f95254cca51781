//! Request execution: single attempts under a deadline, and the retry loop.

use crate::error::{Error, ErrorMeta};
use crate::telemetry::mask_user_id;
use crate::transport::{TransportError, TransportRequest, TransportResponse};
use crate::Result;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::core::GatewayClient;
use super::error_classification::{classify_http, FailureContext};
use super::policy::{Decision, RetryPolicy};
use super::request::build_headers;

/// Per-call facts threaded through the dispatch loop.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CallContext<'a> {
    pub model: &'a str,
    pub user: Option<&'a str>,
    pub structured: bool,
}

/// Result of one attempt.
enum Attempt {
    Response(TransportResponse),
    TimedOut(Option<TransportError>),
    Failed(TransportError),
}

fn header_first(headers: &HashMap<String, String>, names: &[&str]) -> Option<String> {
    for name in names {
        if let Some(v) = headers.get(*name) {
            let v = v.trim();
            if !v.is_empty() {
                return Some(v.to_string());
            }
        }
    }
    None
}

impl GatewayClient {
    /// Issues one HTTP call, cancelled when the configured deadline elapses.
    async fn execute_once(&self, request: TransportRequest) -> Attempt {
        let timeout = self.config.request_timeout;
        match tokio::time::timeout(timeout, self.transport.post_json(request)).await {
            Err(_elapsed) => Attempt::TimedOut(None),
            Ok(Ok(resp)) => Attempt::Response(resp),
            Ok(Err(e)) if e.is_timeout() => Attempt::TimedOut(Some(e)),
            Ok(Err(e)) => Attempt::Failed(e),
        }
    }

    /// Sends `body` with retries and returns the decoded 2xx JSON plus the
    /// gateway request id.
    pub(crate) async fn request_with_retry(
        &self,
        body: Value,
        call: CallContext<'_>,
    ) -> Result<(Value, Option<String>)> {
        let policy = RetryPolicy::new(self.config.max_retries);
        let request = TransportRequest {
            url: self.config.completions_url(),
            headers: build_headers(&self.config),
            body,
        };
        let client_request_id = Uuid::new_v4().to_string();
        let user = call.user.map(mask_user_id);
        let started = Instant::now();
        let mut last_transport_err: Option<TransportError> = None;

        for attempt in 0..=policy.max_retries {
            let attempt_no = attempt + 1;
            debug!(
                client_request_id = %client_request_id,
                model = call.model,
                attempt = attempt_no,
                "OpenRouter request attempt"
            );

            let resp = match self.execute_once(request.clone()).await {
                Attempt::Response(resp) => resp,
                Attempt::TimedOut(source) => {
                    warn!(
                        client_request_id = %client_request_id,
                        model = call.model,
                        attempt = attempt_no,
                        timeout_ms = self.config.request_timeout.as_millis() as u64,
                        "OpenRouter request timed out"
                    );
                    return Err(Error::timeout(
                        "OpenRouter request timed out.",
                        ErrorMeta::new().with_status(408).with_model(call.model),
                        source,
                    ));
                }
                Attempt::Failed(e) => match policy.decide_transport(attempt) {
                    Decision::Retry { delay } => {
                        warn!(
                            client_request_id = %client_request_id,
                            model = call.model,
                            attempt = attempt_no,
                            max_retries = policy.max_retries,
                            delay_ms = delay.as_millis() as u64,
                            error = %e,
                            user = ?user,
                            "OpenRouter transport error (will retry)"
                        );
                        last_transport_err = Some(e);
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    Decision::Fail => {
                        return Err(Error::Upstream {
                            status: 503,
                            message: "OpenRouter request failed (transport error).".into(),
                            meta: ErrorMeta::new().with_status(503).with_model(call.model),
                            source: Some(e),
                        });
                    }
                },
            };

            let request_id =
                header_first(&resp.headers, &["x-request-id", "x-openrouter-request-id"]);

            if !resp.is_success() {
                let status = resp.status;
                let payload = serde_json::from_str::<Value>(&resp.body).ok();
                let err = classify_http(
                    status,
                    payload,
                    FailureContext {
                        model: call.model,
                        request_id: request_id.as_deref(),
                        structured: call.structured,
                    },
                );

                match policy.decide_status(status, attempt) {
                    Decision::Retry { delay } => {
                        warn!(
                            client_request_id = %client_request_id,
                            http_status = status,
                            code = err.code(),
                            model = call.model,
                            attempt = attempt_no,
                            max_retries = policy.max_retries,
                            request_id = ?request_id,
                            delay_ms = delay.as_millis() as u64,
                            user = ?user,
                            "OpenRouter request failed (will retry)"
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    Decision::Fail => return Err(err),
                }
            }

            let json = serde_json::from_str::<Value>(&resp.body).map_err(|e| {
                Error::response_parse(
                    "OpenRouter returned invalid JSON.",
                    ErrorMeta::new()
                        .with_status(resp.status)
                        .with_model(call.model)
                        .with_request_id(request_id.clone()),
                    Some(e),
                )
            })?;

            info!(
                client_request_id = %client_request_id,
                http_status = resp.status,
                model = call.model,
                attempt = attempt_no,
                request_id = ?request_id,
                elapsed_ms = started.elapsed().as_millis() as u64,
                user = ?user,
                "OpenRouter request succeeded"
            );

            return Ok((json, request_id));
        }

        Err(Error::Upstream {
            status: 503,
            message: "OpenRouter request failed after retries.".into(),
            meta: ErrorMeta::new().with_status(503).with_model(call.model),
            source: last_transport_err,
        })
    }
}
