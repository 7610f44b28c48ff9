use std::time::Duration;

use async_trait::async_trait;
use tokio::time;

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Clock driving the stream liveness guard.
#[async_trait]
pub trait Ticker: Send {
    /// Resolves on the next tick. Must be cancel safe.
    async fn tick(&mut self);
}

pub struct IntervalTicker {
    interval: time::Interval,
}

impl IntervalTicker {
    pub fn every(period: Duration) -> IntervalTicker {
        let mut interval = time::interval_at(time::Instant::now() + period, period);
        interval.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

        return IntervalTicker { interval };
    }
}

#[async_trait]
impl Ticker for IntervalTicker {
    #[allow(clippy::implicit_return)]
    async fn tick(&mut self) {
        self.interval.tick().await;
    }
}
