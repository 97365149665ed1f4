use std::time::Duration;

use tracing::{debug, error, info};

use crate::clock::Clock;
use crate::leave::engine::LeaveService;
use crate::store::LeaveStore;

/// Spawn the recurring expiry sweep on the current arbiter.
///
/// Every tick runs the same routine the manual admin trigger uses. A failed
/// sweep is logged and the schedule keeps ticking; the next run retries
/// against the then-current cutoff. The returned handle is aborted at
/// shutdown — each record's cancellation is a single conditional write, so
/// an interrupted batch leaves no half-applied transition.
pub fn spawn<S, C>(
    service: LeaveService<S, C>,
    every_secs: u64,
) -> actix_web::rt::task::JoinHandle<()>
where
    S: LeaveStore + 'static,
    C: Clock,
{
    actix_web::rt::spawn(async move {
        let mut ticker = actix_web::rt::time::interval(Duration::from_secs(every_secs));
        // the first tick completes immediately; skip it so startup does not
        // race the schema bootstrap
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match service.run_expiry_sweep().await {
                Ok(0) => debug!("expiry sweep found no stale pending requests"),
                Ok(count) => info!(cancelled = count, "expiry sweep finished"),
                Err(e) => error!(error = %e, "expiry sweep failed"),
            }
        }
    })
}
