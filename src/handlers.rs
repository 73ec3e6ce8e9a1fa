//! Task handlers — the domain logic run by workers, one function per job
//! kind, plus the progress side-channel they report through.
//!
//! Handlers are pure apart from the progress reports and the simulated work
//! delays; failures come back as typed errors, never panics.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use tokio::time::sleep;
use tracing::warn;
use uuid::Uuid;

use crate::error::HandlerError;
use crate::job::{Job, JobOutput, JobSpec, JobStatus, Progress};
use crate::registry::JobRegistry;

/// Number of simulated work ticks for a division job.
const DIVIDE_TICKS: u32 = 5;

/// Progress side-channel handed to a handler for one job.
///
/// `total` is fixed at dispatch time. Reports with a decreasing `current`
/// are dropped and `current` is clamped to `total`, so published progress
/// is always monotonic and in range.
pub struct ProgressSink {
    registry: Arc<JobRegistry>,
    job_id: Uuid,
    total: u32,
    last: AtomicU32,
}

impl ProgressSink {
    pub fn new(registry: Arc<JobRegistry>, job_id: Uuid, total: u32) -> Self {
        Self {
            registry,
            job_id,
            total,
            last: AtomicU32::new(0),
        }
    }

    /// Report one progress tick.
    pub fn report(&self, current: u32, message: impl Into<String>) {
        let current = if current > self.total {
            warn!(job_id = %self.job_id, current, total = self.total, "Progress past total clamped");
            self.total
        } else {
            current
        };

        let prev = self.last.fetch_max(current, Ordering::Relaxed);
        if current < prev {
            warn!(job_id = %self.job_id, current, prev, "Non-monotonic progress report dropped");
            return;
        }

        self.registry.publish(JobStatus::progress(
            self.job_id,
            Progress {
                current,
                total: self.total,
                message: message.into(),
            },
        ));
    }
}

/// Run the handler matching the job's kind.
pub async fn run(
    job: &Job,
    progress: &ProgressSink,
    tick: Duration,
) -> Result<JobOutput, HandlerError> {
    match &job.spec {
        JobSpec::Divide { dividend, divisor } => divide(*dividend, *divisor, progress, tick).await,
        JobSpec::RepeatText { text, repeat } => {
            Ok(repeat_text(text, *repeat, progress, tick).await)
        }
    }
}

/// Divide `x` by `y` after five simulated work ticks.
///
/// The divisor check lives here, not at the submission boundary, so a zero
/// divisor surfaces asynchronously as a Failure snapshot.
async fn divide(
    x: f64,
    y: f64,
    progress: &ProgressSink,
    tick: Duration,
) -> Result<JobOutput, HandlerError> {
    progress.report(0, "Starting...");

    for i in 1..=DIVIDE_TICKS {
        sleep(tick).await;
        progress.report(i, format!("Processing... {i}/{DIVIDE_TICKS}"));
    }

    if y == 0.0 {
        return Err(HandlerError::DivisionByZero);
    }

    Ok(JobOutput::Quotient(x / y))
}

/// Repeat `text` uppercased and 1-indexed, one tick per item, joined with
/// `" | "` after a final settling delay. Args are validated at submission.
async fn repeat_text(text: &str, repeat: u32, progress: &ProgressSink, tick: Duration) -> JobOutput {
    progress.report(0, "Initializing...");

    sleep(tick * 2).await;
    progress.report(2, "Processing text...");

    let mut items = Vec::with_capacity(repeat as usize);
    for i in 1..=repeat {
        sleep(tick).await;
        items.push(format!("{i}. {}", text.to_uppercase()));
        progress.report(i + 2, format!("Processing item {i}/{repeat}"));
    }

    sleep(tick * 5).await;
    JobOutput::Text(items.join(" | "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::JobState;

    const TICK: Duration = Duration::ZERO;

    async fn dispatched(spec: JobSpec) -> (Arc<JobRegistry>, Job, ProgressSink) {
        let registry = Arc::new(JobRegistry::new(Duration::from_secs(3600), true));
        let job = Job::new(spec);
        registry.insert(&job).await;
        registry.publish(JobStatus::started(job.id));
        let sink = ProgressSink::new(Arc::clone(&registry), job.id, job.spec.progress_total());
        (registry, job, sink)
    }

    #[tokio::test]
    async fn divide_returns_quotient() {
        let (_registry, job, sink) = dispatched(JobSpec::Divide {
            dividend: 10.0,
            divisor: 4.0,
        })
        .await;

        let output = run(&job, &sink, TICK).await.unwrap();
        assert_eq!(output, JobOutput::Quotient(2.5));
    }

    #[tokio::test]
    async fn divide_by_zero_fails() {
        let (_registry, job, sink) = dispatched(JobSpec::Divide {
            dividend: 10.0,
            divisor: 0.0,
        })
        .await;

        let err = run(&job, &sink, TICK).await.unwrap_err();
        assert_eq!(err, HandlerError::DivisionByZero);
    }

    #[tokio::test]
    async fn divide_reports_all_ticks() {
        let (registry, job, sink) = dispatched(JobSpec::Divide {
            dividend: 10.0,
            divisor: 2.0,
        })
        .await;

        run(&job, &sink, TICK).await.unwrap();

        let status = registry.get(job.id).unwrap();
        assert_eq!(status.state, JobState::Progress);
        let progress = status.progress.unwrap();
        assert_eq!(progress.current, 5);
        assert_eq!(progress.total, 5);
        assert_eq!(progress.message, "Processing... 5/5");
    }

    #[tokio::test]
    async fn repeat_text_joins_uppercased_items() {
        let (registry, job, sink) = dispatched(JobSpec::RepeatText {
            text: "hello".into(),
            repeat: 3,
        })
        .await;

        let output = run(&job, &sink, TICK).await.unwrap();
        assert_eq!(
            output,
            JobOutput::Text("1. HELLO | 2. HELLO | 3. HELLO".into())
        );

        let progress = registry.get(job.id).unwrap().progress.unwrap();
        assert_eq!(progress.current, 5);
        assert_eq!(progress.total, 13);
    }

    #[tokio::test]
    async fn sink_drops_non_monotonic_reports() {
        let (registry, job, sink) = dispatched(JobSpec::Divide {
            dividend: 1.0,
            divisor: 1.0,
        })
        .await;

        sink.report(3, "three");
        sink.report(1, "backwards");

        let progress = registry.get(job.id).unwrap().progress.unwrap();
        assert_eq!(progress.current, 3);
        assert_eq!(progress.message, "three");
    }

    #[tokio::test]
    async fn sink_clamps_past_total() {
        let (registry, job, sink) = dispatched(JobSpec::Divide {
            dividend: 1.0,
            divisor: 1.0,
        })
        .await;

        sink.report(9, "too far");

        let progress = registry.get(job.id).unwrap().progress.unwrap();
        assert_eq!(progress.current, 5);
        assert_eq!(progress.total, 5);
    }
}
