//! Queue service — the submit/query surface consumed by the HTTP layer.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::broker::Broker;
use crate::error::{JobError, Result, ValidationError};
use crate::job::{Job, JobSpec, JobStatus};
use crate::registry::JobRegistry;

/// One row of a recent-jobs listing.
#[derive(Debug, Clone, Serialize)]
pub struct JobSummary {
    /// Abbreviated id for display, e.g. `a1b2c3d4...`.
    pub short_id: String,
    pub display_name: String,
    pub status: JobStatus,
}

/// Submission and query API over an injected broker + registry pair.
#[derive(Clone)]
pub struct QueueService {
    broker: Broker,
    registry: Arc<JobRegistry>,
}

impl QueueService {
    pub fn new(broker: Broker, registry: Arc<JobRegistry>) -> Self {
        Self { broker, registry }
    }

    /// Validate and enqueue a job, returning its id without waiting for
    /// execution. Invalid args are rejected here and no job is created.
    pub async fn submit(&self, spec: JobSpec) -> Result<Uuid> {
        validate(&spec)?;

        let job = Job::new(spec);
        let id = job.id;
        self.broker.enqueue(job).await?;

        info!(job_id = %id, "Job submitted");
        Ok(id)
    }

    /// Latest status snapshot for a job.
    pub fn query(&self, id: Uuid) -> Result<JobStatus> {
        self.registry
            .get(id)
            .ok_or_else(|| JobError::NotFound { id }.into())
    }

    /// The most recently submitted jobs, newest first, truncated to `limit`.
    /// Jobs whose status has expired are omitted.
    pub async fn list_recent(&self, limit: usize) -> Vec<JobSummary> {
        self.registry
            .recent(limit)
            .await
            .into_iter()
            .filter_map(|(id, display_name)| {
                self.registry.get(id).map(|status| JobSummary {
                    short_id: short_id(id),
                    display_name,
                    status,
                })
            })
            .collect()
    }
}

/// Cheap synchronous argument checks. The divisor is deliberately not
/// checked here — that is the divide handler's job.
fn validate(spec: &JobSpec) -> std::result::Result<(), ValidationError> {
    match spec {
        JobSpec::Divide { .. } => Ok(()),
        JobSpec::RepeatText { text, repeat } => {
            if text.trim().is_empty() {
                return Err(ValidationError::EmptyText);
            }
            if !(1..=10).contains(repeat) {
                return Err(ValidationError::RepeatOutOfRange { given: *repeat });
            }
            Ok(())
        }
    }
}

fn short_id(id: Uuid) -> String {
    let full = id.to_string();
    format!("{}...", &full[..8])
}
