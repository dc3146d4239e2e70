//! Tokio Timer

use std::time::Duration;

use storefront_core::gateway::Timer;

/// `Timer` backed by `tokio::time::sleep`
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioTimer;

impl Timer for TokioTimer {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_sleep_waits() {
        let start = tokio::time::Instant::now();
        TokioTimer.sleep(Duration::from_millis(1200)).await;
        assert!(start.elapsed() >= Duration::from_millis(1200));
    }
}
