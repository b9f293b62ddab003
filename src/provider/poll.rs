use rand::Rng;
use std::{future::Future, time::Duration};
use tokio::time::{sleep, Instant};
use tracing::debug;

/// Backoff schedule for waiting on remote asynchronous state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub initial_interval: Duration,
    pub max_interval: Duration,
    pub timeout: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_secs(5),
            max_interval: Duration::from_secs(30),
            timeout: Duration::from_secs(600),
        }
    }
}

impl PollPolicy {
    /// Interval that follows `current`: doubled, never above `max_interval`.
    #[must_use]
    pub fn next_interval(&self, current: Duration) -> Duration {
        current.saturating_mul(2).min(self.max_interval)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Ready { attempts: u32 },
    TimedOut { attempts: u32, waited: Duration },
}

/// Call `probe` until it reports ready, an error, or the timeout elapses.
///
/// The first probe runs immediately. Probe errors are returned as is.
///
/// # Errors
/// Returns the first error produced by `probe`.
pub async fn poll_until<F, Fut, E>(policy: PollPolicy, mut probe: F) -> Result<PollOutcome, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool, E>>,
{
    let started = Instant::now();
    let mut interval = policy.initial_interval;
    let mut attempts = 0;

    loop {
        attempts += 1;
        if probe().await? {
            return Ok(PollOutcome::Ready { attempts });
        }

        let waited = started.elapsed();
        if waited >= policy.timeout {
            return Ok(PollOutcome::TimedOut { attempts, waited });
        }

        let pause = jittered(interval).min(policy.timeout.saturating_sub(waited));
        debug!("not ready after attempt {attempts}, sleeping {pause:?}");
        sleep(pause).await;

        interval = policy.next_interval(interval);
    }
}

// up to 10% extra so concurrent invocations spread out
fn jittered(interval: Duration) -> Duration {
    let millis = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
    if millis < 10 {
        return interval;
    }
    let extra = rand::thread_rng().gen_range(0..=millis / 10);
    interval + Duration::from_millis(extra)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast() -> PollPolicy {
        PollPolicy {
            initial_interval: Duration::from_millis(1),
            max_interval: Duration::from_millis(4),
            timeout: Duration::from_millis(200),
        }
    }

    #[test]
    fn interval_doubles_up_to_cap() {
        let policy = PollPolicy::default();
        let mut interval = policy.initial_interval;
        let mut seen = vec![];
        for _ in 0..5 {
            seen.push(interval.as_secs());
            interval = policy.next_interval(interval);
        }
        assert_eq!(seen, vec![5, 10, 20, 30, 30]);
    }

    #[tokio::test]
    async fn ready_after_some_attempts() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let outcome = poll_until(fast(), move || async move {
            Ok::<_, ()>(calls.fetch_add(1, Ordering::SeqCst) == 3)
        })
        .await
        .unwrap();

        assert_eq!(outcome, PollOutcome::Ready { attempts: 4 });
    }

    #[tokio::test]
    async fn errors_stop_polling() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result = poll_until(fast(), move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err::<bool, _>("boom")
        })
        .await;

        assert_eq!(result, Err("boom"));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_timeout() {
        let policy = PollPolicy {
            initial_interval: Duration::from_secs(5),
            max_interval: Duration::from_secs(30),
            timeout: Duration::from_secs(60),
        };

        let outcome = poll_until(policy, || async { Ok::<_, ()>(false) })
            .await
            .unwrap();

        match outcome {
            PollOutcome::TimedOut { attempts, waited } => {
                assert!(attempts >= 3);
                assert!(waited >= policy.timeout);
            }
            PollOutcome::Ready { .. } => panic!("never ready"),
        }
    }
}
