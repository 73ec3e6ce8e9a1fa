//! Job types and the job state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a job does: the kind together with its kind-specific arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JobSpec {
    /// Divide `dividend` by `divisor`, with simulated work delays.
    Divide { dividend: f64, divisor: f64 },
    /// Repeat `text` (uppercased, numbered) `repeat` times.
    RepeatText { text: String, repeat: u32 },
}

impl JobSpec {
    /// Short kind name for logging and summaries.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Divide { .. } => "divide",
            Self::RepeatText { .. } => "repeat_text",
        }
    }

    /// The progress denominator, fixed at dispatch time.
    pub fn progress_total(&self) -> u32 {
        match self {
            Self::Divide { .. } => 5,
            Self::RepeatText { repeat, .. } => repeat + 10,
        }
    }

    /// Human label shown in job listings.
    pub fn display_name(&self) -> String {
        match self {
            Self::Divide { dividend, divisor } => {
                format!("Division: {dividend} ÷ {divisor}")
            }
            Self::RepeatText { text, repeat } => {
                format!("Text Processing: \"{text}\" x{repeat}")
            }
        }
    }
}

/// One unit of submitted work. Immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Unique job ID.
    pub id: Uuid,
    /// Kind and arguments.
    pub spec: JobSpec,
    /// Human label for listings.
    pub display_name: String,
    /// When the job was submitted.
    pub submitted_at: DateTime<Utc>,
}

impl Job {
    /// Create a new job from a spec. The caller validates the spec first.
    pub fn new(spec: JobSpec) -> Self {
        Self {
            id: Uuid::new_v4(),
            display_name: spec.display_name(),
            spec,
            submitted_at: Utc::now(),
        }
    }
}

/// State of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    /// Job is queued, waiting for a worker.
    Pending,
    /// A worker picked up the job.
    Started,
    /// The handler reported an intermediate progress tick.
    Progress,
    /// Job finished with a result.
    Success,
    /// Job failed with an error.
    Failure,
}

impl JobState {
    /// Check if this state allows transitioning to another state.
    pub fn can_transition_to(&self, target: JobState) -> bool {
        use JobState::*;

        matches!(
            (self, target),
            (Pending, Started)
                | (Started, Progress)
                | (Started, Success)
                | (Started, Failure)
                | (Progress, Progress)
                | (Progress, Success)
                | (Progress, Failure)
        )
    }

    /// Check if this is a terminal state. Terminal snapshots are final.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Failure)
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Started => "started",
            Self::Progress => "progress",
            Self::Success => "success",
            Self::Failure => "failure",
        };
        write!(f, "{s}")
    }
}

/// An intermediate progress tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    /// Completed units, non-decreasing until terminal.
    pub current: u32,
    /// Total units, fixed when the job is dispatched.
    pub total: u32,
    /// Human-readable status line.
    pub message: String,
}

/// Kind-specific result value of a successful job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobOutput {
    Quotient(f64),
    Text(String),
}

/// Point-in-time status snapshot of a job.
///
/// Written only by the worker executing the job; each write fully replaces
/// the previous snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobStatus {
    pub id: Uuid,
    pub state: JobState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<Progress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<JobOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl JobStatus {
    pub fn pending(id: Uuid) -> Self {
        Self::bare(id, JobState::Pending)
    }

    pub fn started(id: Uuid) -> Self {
        Self::bare(id, JobState::Started)
    }

    pub fn progress(id: Uuid, progress: Progress) -> Self {
        Self {
            progress: Some(progress),
            ..Self::bare(id, JobState::Progress)
        }
    }

    pub fn success(id: Uuid, result: JobOutput) -> Self {
        Self {
            result: Some(result),
            ..Self::bare(id, JobState::Success)
        }
    }

    pub fn failure(id: Uuid, error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::bare(id, JobState::Failure)
        }
    }

    fn bare(id: Uuid, state: JobState) -> Self {
        Self {
            id,
            state,
            progress: None,
            result: None,
            error: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_transitions_valid() {
        assert!(JobState::Pending.can_transition_to(JobState::Started));
        assert!(JobState::Started.can_transition_to(JobState::Progress));
        assert!(JobState::Started.can_transition_to(JobState::Success));
        assert!(JobState::Progress.can_transition_to(JobState::Progress));
        assert!(JobState::Progress.can_transition_to(JobState::Failure));
    }

    #[test]
    fn state_transitions_invalid() {
        assert!(!JobState::Success.can_transition_to(JobState::Started));
        assert!(!JobState::Failure.can_transition_to(JobState::Progress));
        assert!(!JobState::Pending.can_transition_to(JobState::Success));
        assert!(!JobState::Progress.can_transition_to(JobState::Started));
    }

    #[test]
    fn terminal_states() {
        assert!(JobState::Success.is_terminal());
        assert!(JobState::Failure.is_terminal());
        assert!(!JobState::Pending.is_terminal());
        assert!(!JobState::Started.is_terminal());
        assert!(!JobState::Progress.is_terminal());
    }

    #[test]
    fn progress_total_fixed_per_spec() {
        let divide = JobSpec::Divide {
            dividend: 10.0,
            divisor: 2.0,
        };
        assert_eq!(divide.progress_total(), 5);

        let repeat = JobSpec::RepeatText {
            text: "hi".into(),
            repeat: 3,
        };
        assert_eq!(repeat.progress_total(), 13);
    }

    #[test]
    fn display_names_match_reference() {
        let divide = JobSpec::Divide {
            dividend: 10.0,
            divisor: 2.0,
        };
        assert_eq!(divide.display_name(), "Division: 10 ÷ 2");

        let repeat = JobSpec::RepeatText {
            text: "hello".into(),
            repeat: 3,
        };
        assert_eq!(repeat.display_name(), "Text Processing: \"hello\" x3");
    }

    #[test]
    fn job_ids_unique() {
        let spec = JobSpec::Divide {
            dividend: 1.0,
            divisor: 1.0,
        };
        let a = Job::new(spec.clone());
        let b = Job::new(spec);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn status_snapshots_carry_only_their_fields() {
        let id = Uuid::new_v4();

        let started = JobStatus::started(id);
        assert_eq!(started.state, JobState::Started);
        assert!(started.progress.is_none() && started.result.is_none());

        let success = JobStatus::success(id, JobOutput::Quotient(5.0));
        assert_eq!(success.state, JobState::Success);
        assert_eq!(success.result, Some(JobOutput::Quotient(5.0)));
        assert!(success.error.is_none());

        let failure = JobStatus::failure(id, "division by zero");
        assert_eq!(failure.state, JobState::Failure);
        assert_eq!(failure.error.as_deref(), Some("division by zero"));
        assert!(failure.result.is_none());
    }

    #[test]
    fn job_state_serde() {
        let json = serde_json::to_string(&JobState::Progress).unwrap();
        assert_eq!(json, "\"progress\"");
        let parsed: JobState = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, JobState::Progress);
    }

    #[test]
    fn spec_serde_tagged_by_kind() {
        let json = r#"{"kind":"divide","dividend":10.0,"divisor":2.0}"#;
        let spec: JobSpec = serde_json::from_str(json).unwrap();
        assert_eq!(spec.kind(), "divide");
    }
}
