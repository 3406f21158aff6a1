//! Best-effort fan-out.
//!
//! Runs independent fallible operations concurrently on the current task and
//! waits for every one of them. A failure never cancels its siblings and is
//! never propagated; it is logged and counted.

use std::fmt::Display;
use std::future::Future;

use futures_util::future::join_all;

/// Outcome of [`settle_all`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement<T> {
    /// Values of the operations that succeeded, in input order.
    pub fulfilled: Vec<T>,
    /// Number of operations that failed.
    pub rejected: usize,
}

impl<T> Settlement<T> {
    pub fn total(&self) -> usize {
        self.fulfilled.len() + self.rejected
    }
}

/// Await all `ops`, keeping successes and counting failures.
pub async fn settle_all<I, F, T, E>(ops: I) -> Settlement<T>
where
    I: IntoIterator<Item = F>,
    F: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut settlement = Settlement { fulfilled: Vec::new(), rejected: 0 };

    for result in join_all(ops).await {
        match result {
            Ok(value) => settlement.fulfilled.push(value),
            Err(e) => {
                tracing::debug!(error = %e, "best-effort operation failed");
                settlement.rejected += 1;
            }
        }
    }

    settlement
}
