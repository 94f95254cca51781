use rand::Rng;
use std::time::Duration;

const BASE_DELAY_MS: u64 = 250;
const MAX_DELAY_MS: u64 = 4_000;
const JITTER_MS: u64 = 200;

/// Internal decision for how to proceed after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Decision {
    Retry { delay: Duration },
    Fail,
}

/// Retry policy for the dispatch loop.
///
/// - `attempt` is 0-based (first failure => attempt=0).
/// - Retries are only ever decided for 429, 5xx and non-timeout transport failures.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RetryPolicy {
    pub max_retries: u32,
}

impl RetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self { max_retries }
    }

    pub fn is_retryable_status(status: u16) -> bool {
        status == 429 || (500..=599).contains(&status)
    }

    pub fn decide_status(&self, status: u16, attempt: u32) -> Decision {
        if Self::is_retryable_status(status) {
            self.next(attempt)
        } else {
            Decision::Fail
        }
    }

    /// Connection-level failure. Timeouts never reach here; the dispatch loop
    /// fails them before consulting the policy.
    pub fn decide_transport(&self, attempt: u32) -> Decision {
        self.next(attempt)
    }

    fn next(&self, attempt: u32) -> Decision {
        if attempt < self.max_retries {
            Decision::Retry {
                delay: jittered_backoff(attempt + 1),
            }
        } else {
            Decision::Fail
        }
    }
}

/// `min(4000, 250 * 2^(attempt-1))` ms, attempt numbered from 1.
pub fn base_backoff(attempt: u32) -> Duration {
    let exp = attempt.saturating_sub(1);
    let factor = 1u64.checked_shl(exp).unwrap_or(u64::MAX);
    Duration::from_millis(BASE_DELAY_MS.saturating_mul(factor).min(MAX_DELAY_MS))
}

/// [`base_backoff`] plus uniform jitter in `[0, 200)` ms.
pub fn jittered_backoff(attempt: u32) -> Duration {
    let jitter = rand::rng().random_range(0..JITTER_MS);
    base_backoff(attempt) + Duration::from_millis(jitter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_backoff_doubles_then_caps() {
        let ms: Vec<u128> = (1..=7).map(|a| base_backoff(a).as_millis()).collect();
        assert_eq!(ms, vec![250, 500, 1000, 2000, 4000, 4000, 4000]);
        assert_eq!(base_backoff(0).as_millis(), 250);
        assert_eq!(base_backoff(200).as_millis(), 4000);
    }

    #[test]
    fn jitter_stays_within_bounds() {
        for attempt in 1..=10 {
            for _ in 0..50 {
                let d = jittered_backoff(attempt);
                let base = base_backoff(attempt);
                assert!(d >= base);
                assert!(d < base + Duration::from_millis(JITTER_MS));
                assert!(d.as_millis() <= 4_200);
            }
        }
    }

    #[test]
    fn retries_only_transient_statuses() {
        let policy = RetryPolicy::new(2);
        assert!(matches!(policy.decide_status(500, 0), Decision::Retry { .. }));
        assert!(matches!(policy.decide_status(429, 1), Decision::Retry { .. }));
        assert_eq!(policy.decide_status(429, 2), Decision::Fail);
        assert_eq!(policy.decide_status(401, 0), Decision::Fail);
        assert_eq!(policy.decide_status(404, 0), Decision::Fail);
        assert!(matches!(policy.decide_status(599, 0), Decision::Retry { .. }));
        assert_eq!(policy.decide_status(600, 0), Decision::Fail);
        assert_eq!(policy.decide_status(999, 0), Decision::Fail);
    }

    #[test]
    fn transport_failures_retry_until_budget_spent() {
        let policy = RetryPolicy::new(2);
        assert!(matches!(policy.decide_transport(0), Decision::Retry { .. }));
        assert!(matches!(policy.decide_transport(1), Decision::Retry { .. }));
        assert_eq!(policy.decide_transport(2), Decision::Fail);
        assert_eq!(RetryPolicy::new(0).decide_transport(0), Decision::Fail);
    }
}
