//! Wall-clock implementation of the `Clock` port.

use std::time::{Duration, Instant};

use crate::application::ports::Clock;

/// Real time, sleeping on the tokio timer.
pub struct TokioClock;

impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
