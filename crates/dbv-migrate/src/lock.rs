//! Version row lock acquisition
//!
//! Waiting is unbounded. Callers that need a deadline wrap the whole run in
//! `tokio::time::timeout`; a run aborted that way may leave the flag set, and
//! `Migrator::force_unlock` clears it.

use crate::error::MigrateResult;
use crate::store::VersionStore;
use std::time::Duration;

/// Delay between attempts while another process holds the lock
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Block until `store`'s lock flag is ours.
///
/// Only a database error ends the wait early.
pub async fn acquire(store: &dyn VersionStore, poll_interval: Duration) -> MigrateResult<()> {
    let mut attempts: u64 = 0;
    loop {
        if store.try_acquire().await? {
            if attempts > 0 {
                log::debug!("Lock acquired after {} retries", attempts);
            }
            return Ok(());
        }
        attempts += 1;
        log::info!(
            "Database is locked by another migration run, retrying in {}ms",
            poll_interval.as_millis()
        );
        tokio::time::sleep(poll_interval).await;
    }
}
