//! Timeout helper.

use std::future::Future;
use std::time::Duration;

use crate::error::MaestroError;

/// Wrap a model-backend future with a timeout.
///
/// Expiry is reported as [`MaestroError::BackendUnavailable`].
pub async fn with_timeout<T>(
    duration: Duration,
    future: impl Future<Output = Result<T, MaestroError>>,
) -> Result<T, MaestroError> {
    match tokio::time::timeout(duration, future).await {
        Ok(result) => result,
        Err(_) => Err(MaestroError::BackendUnavailable(format!(
            "no response within {}s",
            duration.as_secs_f64()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn slow_future_times_out() {
        let result: Result<(), _> = with_timeout(Duration::from_secs(2), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;
        assert!(matches!(result, Err(MaestroError::BackendUnavailable(msg)) if msg.contains("2s")));
    }

    #[tokio::test]
    async fn fast_future_passes_through() {
        let result = with_timeout(Duration::from_secs(2), async { Ok(5) }).await;
        assert_eq!(result.unwrap(), 5);
    }
}
