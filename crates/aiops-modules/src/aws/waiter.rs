//! Status polling for resources with asynchronous lifecycles

use aiops_core::{AiOpsError, AiOpsResult};
use std::future::Future;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_WAIT_TIMEOUT_SECS: u64 = 600;
pub const POLL_INTERVAL_SECS: u64 = 5;

/// Target status that a missing resource satisfies
pub const DELETED: &str = "DELETED";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Waiter {
    pub timeout: Duration,
    pub interval: Duration,
}

impl Default for Waiter {
    fn default() -> Self {
        Self::new(DEFAULT_WAIT_TIMEOUT_SECS)
    }
}

impl Waiter {
    pub fn new(timeout_secs: u64) -> Self {
        Self {
            timeout: Duration::from_secs(timeout_secs),
            interval: Duration::from_secs(POLL_INTERVAL_SECS),
        }
    }

    pub fn max_attempts(&self) -> u64 {
        let interval = self.interval.as_secs().max(1);
        (self.timeout.as_secs() / interval).max(1)
    }

    /// Poll `status` until it returns `target`
    ///
    /// `resource` names the thing being waited on in log and error
    /// messages, e.g. `agent ABC123`.
    pub async fn wait_for<F, Fut>(&self, resource: &str, target: &str, mut status: F) -> AiOpsResult<()>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = AiOpsResult<String>>,
    {
        let mut last_status = String::from("UNKNOWN");

        for attempt in 0..self.max_attempts() {
            match status().await {
                Ok(current) if current == target => return Ok(()),
                Ok(current) => {
                    debug!(resource = %resource, status = %current, target = %target, attempt, "Waiting");
                    last_status = current;
                }
                Err(e) if e.is_not_found() && target == DELETED => return Ok(()),
                Err(e) => return Err(e),
            }
            tokio::time::sleep(self.interval).await;
        }

        Err(AiOpsError::timeout(format!(
            "Timeout waiting for {} to reach status '{}'. Last known status: '{}'.",
            resource, target, last_status
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_max_attempts() {
        assert_eq!(Waiter::new(600).max_attempts(), 120);
        assert_eq!(Waiter::new(3).max_attempts(), 1);
        assert_eq!(Waiter::new(0).max_attempts(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reaches_target() {
        let statuses = Mutex::new(vec!["PREPARED", "PREPARING", "NOT_PREPARED"]);
        let result = Waiter::new(60)
            .wait_for("agent A1", "PREPARED", || async {
                Ok(statuses.lock().unwrap().pop().unwrap_or("PREPARED").to_string())
            })
            .await;
        assert!(result.is_ok());
        assert!(statuses.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_names_last_status() {
        let err = Waiter::new(15)
            .wait_for("agent A1", "PREPARED", || async { Ok("PREPARING".to_string()) })
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Timeout waiting for agent A1 to reach status 'PREPARED'. Last known status: 'PREPARING'."
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_not_found_satisfies_deleted_only() {
        let not_found = || async {
            Err::<String, _>(AiOpsError::api("GetAgent", "ResourceNotFoundException", "gone"))
        };
        assert!(Waiter::new(30).wait_for("agent A1", DELETED, not_found).await.is_ok());

        let err = Waiter::new(30)
            .wait_for("agent A1", "PREPARED", not_found)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
