//! Periodic sensor flush.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::debug;

use crate::core::SampleSource;

use super::SessionController;

/// Flush `source` through `controller` every `period` until the returned
/// handle is aborted.
///
/// Ticks missed while the runtime is busy are skipped, not replayed. A zero
/// period is raised to one millisecond.
pub fn spawn_sensor_ticker<S>(
    controller: Arc<SessionController>,
    source: S,
    period: Duration,
) -> JoinHandle<()>
where
    S: SampleSource + 'static,
{
    let period = period.max(Duration::from_millis(1));
    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        debug!(?period, "sensor ticker started");
        loop {
            ticker.tick().await;
            controller.flush_sensors(&source);
        }
    })
}
