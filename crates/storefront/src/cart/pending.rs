//! Handles for in-flight cart writes.

use std::future::{Future, IntoFuture};
use std::pin::Pin;

use tokio::task::JoinHandle;

use super::CartError;

/// A cart write running in the background.
///
/// Mutations return immediately with one of these. Awaiting it yields the
/// outcome of the remote write; dropping it lets the write finish unobserved.
/// Failures are logged either way.
#[derive(Debug)]
pub struct PendingWrite {
    handle: JoinHandle<Result<(), CartError>>,
}

impl PendingWrite {
    /// Spawn `write` on the runtime, logging a failure under `operation`.
    pub(crate) fn spawn<F>(operation: &'static str, write: F) -> Self
    where
        F: Future<Output = Result<(), CartError>> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let result = write.await;
            if let Err(e) = &result {
                tracing::warn!(operation, error = %e, "Cart write failed");
            }
            result
        });
        Self { handle }
    }

    /// Whether the write has finished (successfully or not).
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the write to finish.
    ///
    /// # Errors
    ///
    /// Returns the write's error, or `CartError::Aborted` if the task panicked.
    pub async fn wait(self) -> Result<(), CartError> {
        self.handle
            .await
            .map_err(|e| CartError::Aborted(e.to_string()))?
    }
}

impl IntoFuture for PendingWrite {
    type Output = Result<(), CartError>;
    type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.wait())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use atelier_store::StoreError;

    #[tokio::test]
    async fn test_await_yields_write_result() {
        let ok = PendingWrite::spawn("test", async { Ok(()) });
        assert!(ok.await.is_ok());

        let failed = PendingWrite::spawn("test", async {
            Err(CartError::Store(StoreError::Unavailable("down".to_string())))
        });
        assert!(matches!(failed.await, Err(CartError::Store(_))));
    }

    #[tokio::test]
    async fn test_dropped_write_still_runs() {
        let (tx, rx) = tokio::sync::oneshot::channel();
        drop(PendingWrite::spawn("test", async move {
            tx.send(()).unwrap();
            Ok(())
        }));
        rx.await.unwrap();
    }
}
