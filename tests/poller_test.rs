//! Async-completion poller and retry behaviour

use mongodbatlas::core::poll::{retry_until, Backoff, Refresh, RetryError, StateChangeConf};
use mongodbatlas::domain::{AtlasApiError, PollError, ProviderError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

fn http_error(status: u16, code: &str) -> ProviderError {
    AtlasApiError::Http {
        method: "GET".to_string(),
        path: "/api/atlas/v1.0/groups/p1/clusters/c1".to_string(),
        status,
        error_code: code.to_string(),
        detail: "mocked".to_string(),
    }
    .into()
}

fn snapshot_wait() -> StateChangeConf {
    StateChangeConf::new(["queued", "inProgress"], ["completed"])
        .with_timeout(Duration::from_secs(5))
        .with_poll_interval(Duration::from_millis(5))
}

#[tokio::test]
async fn test_completes_after_two_pending_polls() {
    let calls = AtomicUsize::new(0);

    let result = snapshot_wait()
        .wait_for_state(|| {
            let call = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                let status = if call < 3 { "inProgress" } else { "completed" };
                Ok::<_, ProviderError>(Refresh::new(call, status))
            }
        })
        .await
        .unwrap();

    assert_eq!(result, Some(3));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_timeout_shorter_than_interval() {
    let calls = AtomicUsize::new(0);
    let conf = snapshot_wait()
        .with_timeout(Duration::from_millis(10))
        .with_poll_interval(Duration::from_millis(50));

    let err = conf
        .wait_for_state(|| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, ProviderError>(Refresh::new((), "inProgress")) }
        })
        .await
        .unwrap_err();

    match err {
        PollError::Timeout {
            target,
            last_status,
            timeout,
            last_error,
        } => {
            assert_eq!(target, "completed");
            assert_eq!(last_status, "inProgress");
            assert_eq!(timeout, Duration::from_millis(10));
            assert!(last_error.is_none());
        }
        other => panic!("expected timeout, got {other:?}"),
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_deletion_not_found_is_success() {
    let calls = AtomicUsize::new(0);
    let conf = StateChangeConf::new(["IDLE", "DELETING"], ["DELETED"])
        .with_poll_interval(Duration::from_millis(5))
        .for_deletion();

    let result = conf
        .wait_for_state(|| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<Refresh<()>, _>(http_error(404, "CLUSTER_NOT_FOUND")) }
        })
        .await
        .unwrap();

    assert!(result.is_none());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_not_found_outside_deletion_is_fatal() {
    let err = snapshot_wait()
        .wait_for_state(|| async { Err::<Refresh<()>, _>(http_error(404, "SNAPSHOT_NOT_FOUND")) })
        .await
        .unwrap_err();

    assert!(matches!(err, PollError::Fatal(_)));
}

#[tokio::test]
async fn test_unexpected_status_stops_after_one_call() {
    let calls = AtomicUsize::new(0);

    let err = snapshot_wait()
        .wait_for_state(|| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, ProviderError>(Refresh::new((), "failed")) }
        })
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PollError::UnexpectedState { ref status, .. } if status == "failed"
    ));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_fatal_error_stops_after_one_call() {
    let calls = AtomicUsize::new(0);

    let err = snapshot_wait()
        .wait_for_state(|| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<Refresh<()>, _>(http_error(401, "UNAUTHORIZED")) }
        })
        .await
        .unwrap_err();

    match err {
        PollError::Fatal(inner) => assert_eq!(inner.error_code(), Some("UNAUTHORIZED")),
        other => panic!("expected fatal error, got {other:?}"),
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_transient_errors_are_retried() {
    let calls = AtomicUsize::new(0);

    let result = snapshot_wait()
        .wait_for_state(|| {
            let call = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                match call {
                    1 => Err(http_error(503, "SERVICE_UNAVAILABLE")),
                    2 => Err(AtlasApiError::Connection("connection reset by peer".to_string()).into()),
                    _ => Ok(Refresh::new("s1", "completed")),
                }
            }
        })
        .await
        .unwrap();

    assert_eq!(result, Some("s1"));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_timeout_keeps_last_transient_error() {
    let conf = snapshot_wait().with_timeout(Duration::from_millis(30));

    let err = conf
        .wait_for_state(|| async { Err::<Refresh<()>, _>(http_error(500, "UNEXPECTED_ERROR")) })
        .await
        .unwrap_err();

    match err {
        PollError::Timeout { last_error, .. } => {
            assert!(last_error.unwrap_or_default().contains("UNEXPECTED_ERROR"));
        }
        other => panic!("expected timeout, got {other:?}"),
    }
}

#[tokio::test]
async fn test_retry_until_succeeds_after_retryable_errors() {
    let calls = AtomicUsize::new(0);

    let value = retry_until(
        Duration::from_secs(5),
        Backoff::fixed(Duration::from_millis(1)),
        || {
            let call = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if call < 3 {
                    Err(RetryError::Retryable(http_error(
                        409,
                        "CANNOT_CLOSE_GROUP_ACTIVE_ATLAS_CLUSTERS",
                    )))
                } else {
                    Ok(call)
                }
            }
        },
    )
    .await
    .unwrap();

    assert_eq!(value, 3);
}

#[tokio::test]
async fn test_retry_until_stops_on_client_error() {
    let calls = AtomicUsize::new(0);

    let err = retry_until(
        Duration::from_secs(5),
        Backoff::fixed(Duration::from_millis(1)),
        || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(RetryError::classify(http_error(400, "INVALID_ATTRIBUTE"))) }
        },
    )
    .await
    .unwrap_err();

    assert_eq!(err.error_code(), Some("INVALID_ATTRIBUTE"));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_retry_until_times_out() {
    let err = retry_until(
        Duration::from_millis(20),
        Backoff::fixed(Duration::from_millis(5)),
        || async { Err::<(), _>(RetryError::classify(http_error(502, "BAD_GATEWAY"))) },
    )
    .await
    .unwrap_err();

    assert!(matches!(err, ProviderError::Poll(ref e) if e.is_timeout()));
}
