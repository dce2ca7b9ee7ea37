//! Request pacing strategies
//!
//! A [`Throttle`] is applied unconditionally after a call, whether the call
//! succeeded or not. It is a flat pacing policy, not adaptive backoff; an
//! adaptive strategy can implement the same trait later.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

/// Pacing strategy applied between outbound calls.
#[async_trait]
pub trait Throttle: Send + Sync + 'static {
    /// Suspend the caller for the configured pause.
    async fn pause(&self);

    /// Nominal pause, for logging.
    fn delay(&self) -> Duration;
}

/// Sleeps for the same duration every time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedDelay {
    delay: Duration,
}

impl FixedDelay {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn from_millis(millis: u64) -> Self {
        Self::new(Duration::from_millis(millis))
    }
}

#[async_trait]
impl Throttle for FixedDelay {
    async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }

    fn delay(&self) -> Duration {
        self.delay
    }
}

/// Never pauses. Useful in tests and for providers without rate limits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoDelay;

#[async_trait]
impl Throttle for NoDelay {
    async fn pause(&self) {}

    fn delay(&self) -> Duration {
        Duration::ZERO
    }
}

/// Implement Throttle for Arc<T> where T: Throttle for convenient sharing
#[async_trait]
impl<T: Throttle> Throttle for Arc<T> {
    async fn pause(&self) {
        (**self).pause().await;
    }

    fn delay(&self) -> Duration {
        (**self).delay()
    }
}

#[cfg(test)]
mod tests {
    use tokio::time::Instant;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn fixed_delay_sleeps_for_configured_duration() {
        let throttle = FixedDelay::from_millis(50);
        let started = Instant::now();

        throttle.pause().await;

        assert_eq!(started.elapsed(), Duration::from_millis(50));
        assert_eq!(throttle.delay(), Duration::from_millis(50));
    }

    #[tokio::test(start_paused = true)]
    async fn no_delay_returns_immediately() {
        let started = Instant::now();
        NoDelay.pause().await;
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test]
    async fn shared_throttle_delegates() {
        let shared: Arc<dyn Throttle> = Arc::new(FixedDelay::from_millis(0));
        shared.pause().await;
        assert_eq!(shared.delay(), Duration::ZERO);
    }
}
