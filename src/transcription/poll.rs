//! Fixed-interval polling of remote jobs.

use crate::error::{Result, TekstError};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// State of a remote job as seen by one poll.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum JobStatus<T> {
    Pending(String),
    Completed(T),
    Failed(String),
}

/// Poll `check` every `interval` until the job reaches a terminal state.
///
/// A failed job surfaces as `BackendUnavailable` with the backend's message.
/// Transient errors from a single poll are logged and the poll is repeated;
/// anything else is returned immediately. Gives up after `max_wait`.
pub(crate) async fn poll_until_done<T, F, Fut>(
    backend: &str,
    interval: Duration,
    max_wait: Duration,
    mut check: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<JobStatus<T>>>,
{
    let deadline = Instant::now() + max_wait;
    loop {
        match check().await {
            Ok(JobStatus::Completed(value)) => return Ok(value),
            Ok(JobStatus::Failed(message)) => {
                return Err(TekstError::BackendUnavailable(format!("{}: {}", backend, message)))
            }
            Ok(JobStatus::Pending(state)) => debug!("{} job {}", backend, state),
            Err(e) if e.is_transient() => warn!("{} poll failed: {}", backend, e),
            Err(e) => return Err(e),
        }

        if Instant::now() + interval > deadline {
            return Err(TekstError::BackendUnavailable(format!(
                "{}: job did not finish within {:?}",
                backend, max_wait
            )));
        }
        tokio::time::sleep(interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    const TICK: Duration = Duration::from_millis(1);

    #[tokio::test]
    async fn test_polls_until_completed() {
        let polls = AtomicU32::new(0);
        let value = poll_until_done("test", TICK, Duration::from_secs(5), || {
            let n = polls.fetch_add(1, Ordering::SeqCst);
            async move {
                Ok(match n {
                    0 => JobStatus::Pending("queued".into()),
                    1 => JobStatus::Pending("processing".into()),
                    _ => JobStatus::Completed(42),
                })
            }
        })
        .await
        .unwrap();
        assert_eq!(value, 42);
        assert_eq!(polls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_failed_job_is_backend_unavailable() {
        let result: Result<()> = poll_until_done("test", TICK, Duration::from_secs(5), || async {
            Ok(JobStatus::Failed("audio too short".into()))
        })
        .await;
        match result {
            Err(TekstError::BackendUnavailable(msg)) => assert!(msg.contains("audio too short")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_transient_poll_error_is_retried() {
        let polls = AtomicU32::new(0);
        let value = poll_until_done("test", TICK, Duration::from_secs(5), || {
            let n = polls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(TekstError::BackendUnavailable("502".into()))
                } else {
                    Ok(JobStatus::Completed("done"))
                }
            }
        })
        .await
        .unwrap();
        assert_eq!(value, "done");
    }

    #[tokio::test]
    async fn test_auth_error_stops_polling() {
        let polls = AtomicU32::new(0);
        let result: Result<()> = poll_until_done("test", TICK, Duration::from_secs(5), || {
            polls.fetch_add(1, Ordering::SeqCst);
            async { Err(TekstError::AuthenticationFailed("revoked".into())) }
        })
        .await;
        assert!(matches!(result, Err(TekstError::AuthenticationFailed(_))));
        assert_eq!(polls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_gives_up_at_deadline() {
        let result: Result<()> = poll_until_done("test", TICK, Duration::from_millis(10), || async {
            Ok(JobStatus::Pending("processing".into()))
        })
        .await;
        assert!(matches!(result, Err(TekstError::BackendUnavailable(_))));
    }
}
