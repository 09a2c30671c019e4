use std::time::Duration;

use tokio::time::{sleep_until, Instant};

use crate::domain::Throttle;

/// Keeps at least `interval` between the start of consecutive requests.
/// The first request goes out immediately.
#[derive(Clone, Debug)]
pub struct FixedInterval {
    interval: Duration,
    last: Option<Instant>,
}

impl FixedInterval {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }
}

impl Throttle for FixedInterval {
    async fn ready(&mut self) {
        if let Some(last) = self.last {
            sleep_until(last + self.interval).await;
        }
        self.last = Some(Instant::now());
    }
}
