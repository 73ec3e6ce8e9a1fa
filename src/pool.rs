//! Worker pool — N independent dequeue/execute/publish loops.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::broker::JobStream;
use crate::handlers::{self, ProgressSink};
use crate::job::{Job, JobStatus};
use crate::registry::JobRegistry;

/// A pool of worker tasks draining the job stream.
pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn `size` workers. Each job is executed by exactly one worker;
    /// different jobs run concurrently up to the pool size.
    pub fn spawn(
        size: usize,
        registry: Arc<JobRegistry>,
        stream: JobStream,
        tick: Duration,
    ) -> Self {
        let handles = (0..size)
            .map(|worker_id| {
                let registry = Arc::clone(&registry);
                let stream = stream.clone();
                tokio::spawn(async move {
                    worker_loop(worker_id, registry, stream, tick).await;
                })
            })
            .collect();

        info!(workers = size, "Worker pool started");
        Self { handles }
    }

    /// Number of workers in the pool.
    pub fn size(&self) -> usize {
        self.handles.len()
    }

    /// Wait for all workers to drain the stream and exit. Workers only exit
    /// once every submit-side broker handle is gone.
    pub async fn shutdown(self) {
        join_all(self.handles).await;
        info!("Worker pool shut down");
    }
}

/// One worker's execution loop. Handler failures become Failure snapshots
/// and never terminate the loop.
async fn worker_loop(
    worker_id: usize,
    registry: Arc<JobRegistry>,
    stream: JobStream,
    tick: Duration,
) {
    while let Some(job) = stream.recv().await {
        execute(worker_id, &registry, job, tick).await;
    }
    debug!(worker = worker_id, "Job stream closed, worker exiting");
}

async fn execute(worker_id: usize, registry: &Arc<JobRegistry>, job: Job, tick: Duration) {
    info!(
        worker = worker_id,
        job_id = %job.id,
        kind = job.spec.kind(),
        "Job started"
    );
    registry.publish(JobStatus::started(job.id));

    let sink = ProgressSink::new(Arc::clone(registry), job.id, job.spec.progress_total());

    match handlers::run(&job, &sink, tick).await {
        Ok(output) => {
            info!(worker = worker_id, job_id = %job.id, "Job succeeded");
            registry.publish(JobStatus::success(job.id, output));
        }
        Err(e) => {
            warn!(worker = worker_id, job_id = %job.id, error = %e, "Job failed");
            registry.publish(JobStatus::failure(job.id, e.to_string()));
        }
    }
}
