use std::future::Future;
use std::io;

/// Resolves on the first Ctrl-C.
///
/// If the handler cannot be installed this never resolves, so callers holding a shutdown
/// sender keep it alive instead of shutting down straight away.
pub async fn ctrl_c() {
    resolve_on(tokio::signal::ctrl_c()).await;
}

async fn resolve_on(signal: impl Future<Output = io::Result<()>>) {
    if let Err(e) = signal.await {
        tracing::error!(error = %e, "Failed to listen for Ctrl-C.");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::broadcast;
    use tokio::time::{Duration, timeout};

    #[tokio::test]
    async fn resolves_when_the_signal_arrives() {
        timeout(Duration::from_secs(1), resolve_on(async { Ok(()) }))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn failed_handler_keeps_the_shutdown_channel_open() {
        let (tx, mut rx) = broadcast::channel::<()>(1);
        let task = tokio::spawn(async move {
            resolve_on(async { Err(io::Error::other("no signal handler")) }).await;
            let _ = tx.send(());
        });

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(rx.try_recv(), Err(broadcast::error::TryRecvError::Empty));
        assert!(!task.is_finished());
        task.abort();
    }
}
