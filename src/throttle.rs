//! Pauses between successive upstream requests.

use std::time::Duration;

use async_trait::async_trait;

/// Pause inserted between two consecutive account fetches.
#[async_trait]
pub trait Throttle: Send + Sync {
    async fn pause(&self);
}

/// Sleeps for a fixed duration.
#[derive(Debug, Clone, Copy)]
pub struct SleepThrottle {
    delay: Duration,
}

impl SleepThrottle {
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl Throttle for SleepThrottle {
    async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

/// Does not pause at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoThrottle;

#[async_trait]
impl Throttle for NoThrottle {
    async fn pause(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_sleep_throttle_waits() {
        let start = tokio::time::Instant::now();
        SleepThrottle::new(Duration::from_secs(3)).pause().await;
        assert!(start.elapsed() >= Duration::from_secs(3));
    }

    #[tokio::test]
    async fn test_zero_delay_returns_immediately() {
        let start = std::time::Instant::now();
        SleepThrottle::new(Duration::ZERO).pause().await;
        NoThrottle.pause().await;
        assert!(start.elapsed() < Duration::from_secs(1));
    }
}
