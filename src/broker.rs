//! Broker — the transport between submitters and workers.
//!
//! Job messages travel over a bounded FIFO channel; status snapshots travel
//! back through the shared registry. The broker owns the submit side, a
//! `JobStream` owns the worker side.

use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};
use tracing::debug;
use uuid::Uuid;

use crate::error::BrokerError;
use crate::job::{Job, JobStatus};
use crate::registry::JobRegistry;

/// Submit-side handle: enqueue jobs, publish and read status.
#[derive(Clone)]
pub struct Broker {
    tx: mpsc::Sender<Job>,
    registry: Arc<JobRegistry>,
}

/// Worker-side handle: shared FIFO dequeue. Each job is delivered to exactly
/// one worker regardless of pool size.
#[derive(Clone)]
pub struct JobStream {
    rx: Arc<Mutex<mpsc::Receiver<Job>>>,
}

impl Broker {
    /// Create a broker with a bounded queue, plus its worker-side stream.
    pub fn channel(registry: Arc<JobRegistry>, capacity: usize) -> (Broker, JobStream) {
        let (tx, rx) = mpsc::channel(capacity);
        (
            Broker { tx, registry },
            JobStream {
                rx: Arc::new(Mutex::new(rx)),
            },
        )
    }

    /// Enqueue a job for execution.
    ///
    /// The Pending snapshot is registered before the job hits the transport
    /// so the id is queryable the moment enqueue returns. If the transport
    /// cannot accept the job, the registration is rolled back and the
    /// submission fails — no job is created.
    pub async fn enqueue(&self, job: Job) -> Result<(), BrokerError> {
        let id = job.id;
        self.registry.insert(&job).await;

        if let Err(e) = self.tx.try_send(job) {
            self.registry.remove(id).await;
            let reason = match e {
                mpsc::error::TrySendError::Full(_) => "queue full",
                mpsc::error::TrySendError::Closed(_) => "transport closed",
            };
            return Err(BrokerError::Unavailable {
                reason: reason.to_string(),
            });
        }

        debug!(job_id = %id, "Job enqueued");
        Ok(())
    }

    /// Publish a status snapshot for a job.
    pub fn publish_status(&self, status: JobStatus) {
        self.registry.publish(status);
    }

    /// Read the latest status snapshot for a job.
    pub fn read_status(&self, id: Uuid) -> Option<JobStatus> {
        self.registry.get(id)
    }
}

impl JobStream {
    /// Dequeue the next job in FIFO order, waiting until one is available.
    /// Returns None once the submit side is gone and the queue is drained.
    pub async fn recv(&self) -> Option<Job> {
        self.rx.lock().await.recv().await
    }
}
