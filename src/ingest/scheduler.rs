// src/ingest/scheduler.rs
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::pipeline::Pipeline;

/// Spawn the polling loop: run, sleep the full `interval`, repeat forever.
///
/// Each run executes in its own task, so an error or a panic inside a run is
/// logged and the loop carries on. The caller owns the returned handle.
pub fn spawn_scheduler(pipeline: Arc<Pipeline>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            run_guarded(&pipeline).await;
            tokio::time::sleep(interval).await;
        }
    })
}

/// One run with every failure mode turned into a log line.
/// Returns the number of notifications sent, 0 on failure.
pub async fn run_guarded(pipeline: &Arc<Pipeline>) -> usize {
    let p = Arc::clone(pipeline);
    match tokio::spawn(async move { p.run_once().await }).await {
        Ok(Ok(report)) => report.sent,
        Ok(Err(e)) => {
            tracing::error!(error = ?e, "watcher run failed");
            0
        }
        Err(join_err) => {
            tracing::error!(error = %join_err, "watcher run panicked");
            0
        }
    }
}
