//! Background sweep of expired session records.
//!
//! Reads already treat expired records as absent; this task reclaims their
//! disk space.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::store::SessionStore;

/// Default cleanup interval in seconds.
pub const DEFAULT_CLEANUP_INTERVAL_SECS: u64 = 300;

/// Run one sweep off the async runtime threads.
pub async fn sweep_once(session_store: Arc<SessionStore>) -> Option<usize> {
    let result = tokio::task::spawn_blocking(move || session_store.evict_expired()).await;
    match result {
        Ok(Ok(count)) => Some(count),
        Ok(Err(e)) => {
            warn!(error = %e, "Session sweep failed");
            None
        }
        Err(e) => {
            warn!(error = %e, "Session sweep task panicked");
            None
        }
    }
}

/// Spawn a task that evicts expired sessions every `cleanup_interval_secs`.
///
/// Abort the returned handle to stop it.
pub fn spawn_cleanup_task(
    session_store: Arc<SessionStore>,
    cleanup_interval_secs: u64,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(Duration::from_secs(cleanup_interval_secs.max(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        // First tick fires immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;

            match sweep_once(Arc::clone(&session_store)).await {
                Some(0) => debug!("Session sweep: nothing expired"),
                Some(evicted) => info!(evicted, "Session sweep completed"),
                None => continue,
            }

            if let Ok(remaining) = session_store.session_count() {
                debug!(sessions = remaining, "Session store status");
            }
        }
    })
}
