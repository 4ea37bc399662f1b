//! Fixed pause between remote calls.

use std::time::Duration;

/// Minimum interval the engine waits after every remote call.
///
/// Combined with strictly sequential processing this keeps at most one
/// request outstanding and caps the request rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Throttle {
    interval: Duration,
}

impl Throttle {
    pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(500);

    pub fn fixed(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait out the interval.
    pub async fn pause(&self) {
        tokio::time::sleep(self.interval).await;
    }
}

impl Default for Throttle {
    fn default() -> Self {
        Self::fixed(Self::DEFAULT_INTERVAL)
    }
}
