//! The timer service: fire-and-forget delayed callbacks for scheduled
//! messages and standup flushes. Jobs run on the runtime's workers, not on
//! the request path, and are expected to reacquire the store lock and
//! re-validate their targets themselves.

use std::time::Duration;

use tracing::debug;

/// Run `job` once, no earlier than `delay_secs` from now. A non-positive
/// delay fires as soon as the runtime gets to it. There is no cancellation:
/// jobs whose targets vanished detect that and return silently.
pub fn schedule<F>(delay_secs: i64, job: F)
where
    F: FnOnce() + Send + 'static,
{
    let delay = Duration::from_secs(delay_secs.max(0) as u64);
    debug!(delay_secs, "scheduling deferred job");
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        job();
    });
}
