//! Bounded-retry connection probe.

use std::sync::Arc;
use std::time::Duration;

use crate::config::ProbeConfig;

use super::connector::{ConnectError, Connector};

/// Fixed-delay retry policy. No backoff, no jitter.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum connection attempts per probe
    pub max_attempts: u32,
    /// Delay between attempts
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            // A probe always makes at least one attempt
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    pub fn from_config(config: &ProbeConfig) -> Self {
        Self::new(config.attempts, Duration::from_secs(config.delay))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(5, Duration::from_secs(5))
    }
}

/// Outcome of a probe.
#[derive(Debug, Clone)]
pub enum ProbeOutcome {
    /// A connection was established (and closed again)
    Connected,
    /// Every attempt failed
    Failed {
        attempts: u32,
        last_error: ConnectError,
    },
}

impl ProbeOutcome {
    pub fn is_connected(&self) -> bool {
        matches!(self, ProbeOutcome::Connected)
    }
}

/// Runs connection attempts against a [`Connector`] under a [`RetryPolicy`].
///
/// Concurrent probes are independent; the delay suspends only the calling
/// task. A probe cannot be cancelled from the outside once started.
pub struct Prober {
    connector: Arc<dyn Connector>,
    policy: RetryPolicy,
}

impl Prober {
    pub fn new(connector: Arc<dyn Connector>, policy: RetryPolicy) -> Self {
        Self { connector, policy }
    }

    /// Attempt to reach the database, retrying with a fixed delay.
    ///
    /// Attempts are separated by the policy delay: a success on the first
    /// attempt incurs no delay, and no delay follows the final failure.
    pub async fn probe(&self) -> ProbeOutcome {
        let mut last_error = None;

        for attempt in 1..=self.policy.max_attempts {
            match self.connector.connect().await {
                Ok(()) => {
                    tracing::debug!(attempt, "Database connection established");
                    return ProbeOutcome::Connected;
                }
                Err(e) => {
                    let remaining = self.policy.max_attempts - attempt;
                    tracing::warn!(
                        attempt,
                        remaining,
                        error = %e,
                        "Database not ready"
                    );
                    last_error = Some(e);

                    if remaining > 0 {
                        tokio::time::sleep(self.policy.delay).await;
                    }
                }
            }
        }

        tracing::error!(
            attempts = self.policy.max_attempts,
            "Could not connect to database after multiple retries"
        );

        ProbeOutcome::Failed {
            attempts: self.policy.max_attempts,
            // The loop always runs at least once, so an error was recorded
            last_error: last_error.unwrap_or_else(|| ConnectError::new("no attempt made")),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;
    use tokio::time::Instant;

    use super::*;

    /// Fails every attempt before `succeed_on`, succeeds from then on.
    struct StubConnector {
        attempts: AtomicU32,
        succeed_on: Option<u32>,
    }

    impl StubConnector {
        fn succeeding_on(attempt: u32) -> Self {
            Self {
                attempts: AtomicU32::new(0),
                succeed_on: Some(attempt),
            }
        }

        fn always_failing() -> Self {
            Self {
                attempts: AtomicU32::new(0),
                succeed_on: None,
            }
        }

        fn attempts(&self) -> u32 {
            self.attempts.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Connector for StubConnector {
        async fn connect(&self) -> Result<(), ConnectError> {
            let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
            match self.succeed_on {
                Some(n) if attempt >= n => Ok(()),
                _ => Err(ConnectError::new("connection refused")),
            }
        }
    }

    // Tests run under tokio's paused clock: sleeps advance virtual time
    // instantly, and `Instant::elapsed` reports exactly the slept amount.

    #[tokio::test(start_paused = true)]
    async fn test_connects_on_first_attempt_without_delay() {
        let connector = Arc::new(StubConnector::succeeding_on(1));
        let prober = Prober::new(connector.clone(), RetryPolicy::default());

        let start = Instant::now();
        let outcome = prober.probe().await;

        assert!(outcome.is_connected());
        assert_eq!(connector.attempts(), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_connects_on_third_attempt_after_two_delays() {
        let connector = Arc::new(StubConnector::succeeding_on(3));
        let prober = Prober::new(connector.clone(), RetryPolicy::default());

        let start = Instant::now();
        let outcome = prober.probe().await;

        assert!(outcome.is_connected());
        assert_eq!(connector.attempts(), 3);
        assert_eq!(start.elapsed(), Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausts_retries_when_never_reachable() {
        let connector = Arc::new(StubConnector::always_failing());
        let prober = Prober::new(connector.clone(), RetryPolicy::default());

        let start = Instant::now();
        let outcome = prober.probe().await;

        match outcome {
            ProbeOutcome::Failed {
                attempts,
                last_error,
            } => {
                assert_eq!(attempts, 5);
                assert_eq!(last_error.to_string(), "connection refused");
            }
            ProbeOutcome::Connected => panic!("probe should not connect"),
        }
        assert_eq!(connector.attempts(), 5);
        // Five attempts separated by four delays
        assert_eq!(start.elapsed(), Duration::from_secs(20));
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_policy_attempt_count() {
        let connector = Arc::new(StubConnector::always_failing());
        let policy = RetryPolicy::new(2, Duration::from_secs(1));
        let prober = Prober::new(connector.clone(), policy);

        let start = Instant::now();
        let outcome = prober.probe().await;

        assert!(!outcome.is_connected());
        assert_eq!(connector.attempts(), 2);
        assert_eq!(start.elapsed(), Duration::from_secs(1));
    }

    #[test]
    fn test_policy_makes_at_least_one_attempt() {
        let policy = RetryPolicy::new(0, Duration::from_secs(5));
        assert_eq!(policy.max_attempts, 1);
    }

    #[test]
    fn test_policy_from_config() {
        let config = ProbeConfig {
            attempts: 3,
            delay: 2,
        };
        let policy = RetryPolicy::from_config(&config);
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.delay, Duration::from_secs(2));
    }
}
