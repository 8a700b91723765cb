//! Timeouts and retries for boundary calls.

use crate::{Result, StoreError};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Timeout and retry budget applied to each repository read or persistence write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundaryPolicy {
    /// Per-attempt timeout in seconds (default: 30)
    pub timeout_secs: u64,

    /// Additional attempts after a transient failure (default: 2)
    pub retries: u32,

    /// Pause between attempts in milliseconds (default: 250)
    pub backoff_ms: u64,
}

impl Default for BoundaryPolicy {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            retries: 2,
            backoff_ms: 250,
        }
    }
}

impl BoundaryPolicy {
    /// Per-attempt timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Run `attempt` under the timeout, retrying transient failures.
    ///
    /// # Errors
    ///
    /// Returns the last error once retries are exhausted, or the first
    /// non-transient error immediately.
    pub async fn run<T, F, Fut>(&self, operation: &str, mut attempt: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut tries = 0;
        loop {
            let outcome = match tokio::time::timeout(self.timeout(), attempt()).await {
                Ok(result) => result,
                Err(_) => Err(StoreError::Timeout {
                    operation: operation.to_string(),
                    after: self.timeout(),
                }),
            };

            match outcome {
                Err(e) if e.is_transient() && tries < self.retries => {
                    tries += 1;
                    warn!(operation, attempt = tries, error = %e, "Retrying boundary call");
                    tokio::time::sleep(Duration::from_millis(self.backoff_ms)).await;
                }
                other => return other,
            }
        }
    }
}
