//! Convergence poller
//!
//! Re-evaluates a read-only condition until it yields a value or the time
//! budget runs out. Client-side routing on the player updates hrefs and URLs
//! some time after the click that triggered it; a single check races that
//! update, a bounded poll does not.

use crate::error::{E2eError, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(500);

/// One evaluation of a condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe<T> {
    Ready(T),
    /// Not there yet; carries a description of what was seen instead.
    Pending(String),
}

impl<T> Probe<T> {
    pub fn pending(observed: impl Into<String>) -> Self {
        Probe::Pending(observed.into())
    }

    /// `Ready(value)` when `value` is `Some`, otherwise `Pending(observed)`.
    pub fn from_option(value: Option<T>, observed: impl Into<String>) -> Self {
        match value {
            Some(v) => Probe::Ready(v),
            None => Probe::Pending(observed.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollResult<T> {
    Matched(T),
    TimedOut {
        last_observed: String,
        attempts: usize,
    },
}

impl<T> PollResult<T> {
    pub fn is_matched(&self) -> bool {
        matches!(self, PollResult::Matched(_))
    }

    pub fn matched(self) -> Option<T> {
        match self {
            PollResult::Matched(v) => Some(v),
            PollResult::TimedOut { .. } => None,
        }
    }
}

/// Bounded-time condition poller.
#[derive(Debug, Clone, Copy)]
pub struct Poller {
    timeout: Duration,
    interval: Duration,
}

impl Default for Poller {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            interval: DEFAULT_INTERVAL,
        }
    }
}

impl Poller {
    pub fn new(timeout: Duration, interval: Duration) -> Self {
        Self { timeout, interval }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Poll `condition` until it is ready or the deadline passes.
    ///
    /// Transient errors (see [`E2eError::is_transient`]) count as a
    /// non-matching observation. Anything else is returned immediately.
    pub async fn poll<T, F, Fut>(&self, what: &str, mut condition: F) -> Result<PollResult<T>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Probe<T>>>,
    {
        let start = Instant::now();
        let mut attempts = 0usize;
        let mut last_observed = String::from("<not evaluated>");

        loop {
            attempts += 1;
            match condition().await {
                Ok(Probe::Ready(value)) => {
                    log::debug!(
                        "{} converged after {} attempt(s) in {:?}",
                        what,
                        attempts,
                        start.elapsed()
                    );
                    return Ok(PollResult::Matched(value));
                }
                Ok(Probe::Pending(observed)) => last_observed = observed,
                Err(e) if e.is_transient() => {
                    log::trace!("{}: transient error on attempt {}: {}", what, attempts, e);
                    last_observed = e.to_string();
                }
                Err(e) => return Err(e),
            }

            if start.elapsed() >= self.timeout {
                log::debug!(
                    "{} did not converge within {:?} ({} attempts, last observed: {})",
                    what,
                    self.timeout,
                    attempts,
                    last_observed
                );
                return Ok(PollResult::TimedOut {
                    last_observed,
                    attempts,
                });
            }

            tokio::time::sleep(self.interval).await;
        }
    }

    /// Like [`Poller::poll`], with a timeout turned into [`E2eError::Timeout`].
    pub async fn until<T, F, Fut>(&self, what: &str, condition: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Probe<T>>>,
    {
        match self.poll(what, condition).await? {
            PollResult::Matched(value) => Ok(value),
            PollResult::TimedOut { last_observed, .. } => Err(E2eError::Timeout {
                what: what.to_string(),
                waited: self.timeout,
                last_observed,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn poller() -> Poller {
        Poller::new(Duration::from_secs(5), Duration::from_millis(500))
    }

    #[tokio::test(start_paused = true)]
    async fn test_returns_value_once_condition_holds() {
        let calls = Cell::new(0);
        let start = Instant::now();

        let value = poller()
            .until("third attempt", || {
                calls.set(calls.get() + 1);
                let n = calls.get();
                async move {
                    if n >= 3 {
                        Ok(Probe::Ready(n * 10))
                    } else {
                        Ok(Probe::pending(format!("attempt {}", n)))
                    }
                }
            })
            .await
            .expect("condition should converge");

        assert_eq!(value, 30);
        assert_eq!(calls.get(), 3);
        assert_eq!(start.elapsed(), Duration::from_millis(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_match_reported_within_timeout_plus_interval() {
        let p = poller();
        let start = Instant::now();
        let becomes_true_at = Duration::from_millis(4_900);

        let result = p
            .poll("late condition", || {
                let ready = start.elapsed() >= becomes_true_at;
                async move {
                    Ok(if ready {
                        Probe::Ready(())
                    } else {
                        Probe::pending("not yet")
                    })
                }
            })
            .await
            .unwrap();

        assert!(result.is_matched());
        assert!(start.elapsed() <= p.timeout() + p.interval());
    }

    #[tokio::test(start_paused = true)]
    async fn test_never_true_times_out_no_earlier_than_timeout() {
        let p = poller();
        let start = Instant::now();

        let result: PollResult<()> = p
            .poll("never", || async { Ok(Probe::pending("href=/player/home")) })
            .await
            .unwrap();

        let elapsed = start.elapsed();
        assert!(elapsed >= p.timeout(), "timed out early: {:?}", elapsed);
        assert!(elapsed <= p.timeout() + p.interval());
        match result {
            PollResult::TimedOut {
                last_observed,
                attempts,
            } => {
                assert_eq!(last_observed, "href=/player/home");
                assert_eq!(attempts, 11);
            }
            PollResult::Matched(_) => panic!("condition never holds"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_until_converts_timeout_into_error() {
        let err = poller()
            .with_timeout(Duration::from_secs(1))
            .until::<(), _, _>("for-you href", || async { Ok(Probe::pending("no uuid")) })
            .await
            .unwrap_err();

        match err {
            E2eError::Timeout {
                what,
                waited,
                last_observed,
            } => {
                assert_eq!(what, "for-you href");
                assert_eq!(waited, Duration::from_secs(1));
                assert_eq!(last_observed, "no uuid");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_errors_are_absorbed() {
        let calls = Cell::new(0);

        let value = poller()
            .until("stale then ready", || {
                calls.set(calls.get() + 1);
                let n = calls.get();
                async move {
                    if n < 3 {
                        Err(E2eError::Interaction("stale element".to_string()))
                    } else {
                        Ok(Probe::Ready("ok"))
                    }
                }
            })
            .await
            .unwrap();

        assert_eq!(value, "ok");
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unexpected_errors_propagate_immediately() {
        let calls = Cell::new(0);
        let start = Instant::now();

        let err = poller()
            .poll::<(), _, _>("broken", || {
                calls.set(calls.get() + 1);
                async { Err(E2eError::NoPage) }
            })
            .await
            .unwrap_err();

        assert!(matches!(err, E2eError::NoPage));
        assert_eq!(calls.get(), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[test]
    fn test_probe_from_option() {
        assert_eq!(Probe::from_option(Some(1), "none"), Probe::Ready(1));
        assert_eq!(
            Probe::<i32>::from_option(None, "none"),
            Probe::Pending("none".to_string())
        );
    }
}
