//! Request pacing for the Jikan API.
//!
//! Callers take pacing turns strictly in the order they arrive. Each turn
//! waits out whatever remains of the minimum interval since the previous
//! dispatch, records the new dispatch time and hands the lane to the next
//! caller. The HTTP call itself runs outside the lane.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};

/// Default minimum interval between dispatches (Jikan allows ~3 req/s).
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(400);

/// Single-lane pacer enforcing a minimum interval between dispatches
#[derive(Debug)]
pub struct Pacer {
    /// Minimum time between two consecutive dispatches
    min_interval: Duration,
    /// Time the most recent turn was granted
    last_dispatch: Mutex<Option<Instant>>,
}

impl Pacer {
    /// Create a new pacer
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_dispatch: Mutex::new(None),
        }
    }

    /// Configured minimum interval
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Wait for this caller's pacing turn and return its dispatch instant.
    ///
    /// The lane is a fair mutex, so turns are granted in call order. The
    /// lock is held across the wait so no later caller can compute its
    /// delay against a stale timestamp.
    pub async fn turn(&self) -> Instant {
        let mut last_dispatch = self.last_dispatch.lock().await;

        if let Some(last) = *last_dispatch {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                let wait_time = self.min_interval - elapsed;
                tracing::debug!(
                    wait_ms = wait_time.as_millis() as u64,
                    "Pacing: waiting for minimum interval"
                );
                sleep(wait_time).await;
            }
        }

        let now = Instant::now();
        *last_dispatch = Some(now);
        now
    }

    /// Time of the most recent dispatch, if any
    pub async fn last_dispatch(&self) -> Option<Instant> {
        *self.last_dispatch.lock().await
    }
}

impl Default for Pacer {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future::join_all;

    #[tokio::test(start_paused = true)]
    async fn test_first_turn_does_not_wait() {
        let pacer = Pacer::new(Duration::from_secs(5));

        let start = Instant::now();
        let dispatched = pacer.turn().await;

        assert_eq!(dispatched, start);
        assert_eq!(pacer.last_dispatch().await, Some(dispatched));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sequential_turns_respect_interval() {
        let pacer = Pacer::new(Duration::from_millis(400));

        let first = pacer.turn().await;
        let second = pacer.turn().await;

        assert!(second - first >= Duration::from_millis(400));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_wait_when_interval_already_elapsed() {
        let pacer = Pacer::new(Duration::from_millis(400));

        pacer.turn().await;
        sleep(Duration::from_millis(1000)).await;

        let before = Instant::now();
        let dispatched = pacer.turn().await;
        assert_eq!(dispatched, before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_turns_are_spaced() {
        let pacer = Pacer::new(Duration::from_millis(400));
        let start = Instant::now();

        let dispatched = join_all((0..5).map(|_| pacer.turn())).await;

        for pair in dispatched.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_millis(400));
        }
        assert_eq!(dispatched[0], start);
        assert!(dispatched[4] - dispatched[0] >= Duration::from_millis(1600));
    }

    #[tokio::test(start_paused = true)]
    async fn test_turns_are_granted_in_call_order() {
        let pacer = Pacer::new(Duration::from_millis(100));

        // join_all polls in order, so caller i queues before caller i + 1
        let dispatched = join_all((0..8).map(|_| pacer.turn())).await;

        for pair in dispatched.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_interval_never_waits() {
        let pacer = Pacer::new(Duration::ZERO);
        let start = Instant::now();

        let dispatched = join_all((0..3).map(|_| pacer.turn())).await;

        assert!(dispatched.iter().all(|&t| t == start));
    }

    #[tokio::test(start_paused = true)]
    async fn test_instances_are_independent() {
        let a = Pacer::new(Duration::from_secs(1));
        let b = Pacer::new(Duration::from_secs(1));
        let start = Instant::now();

        a.turn().await;
        let b_first = b.turn().await;

        assert_eq!(b_first, start);
    }

    #[test]
    fn test_default_interval() {
        let pacer = Pacer::default();
        assert_eq!(pacer.min_interval(), Duration::from_millis(400));
    }
}
