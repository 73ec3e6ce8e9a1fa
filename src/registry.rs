//! Job registry — process-wide map from job id to its latest status snapshot.
//!
//! Backed by a sharded concurrent map so queriers polling one job never block
//! the worker publishing another. Terminal snapshots are final: the expiry
//! deadline is recorded in the same entry write, and a background sweep
//! reclaims terminal entries once the retention window has passed.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::job::{Job, JobStatus};

/// Number of (id, display_name) pairs kept in the recent job log.
const RECENT_LOG_CAP: usize = 10;

struct Entry {
    status: JobStatus,
    /// Set by the terminal write; the entry reads as gone after this instant.
    expires_at: Option<Instant>,
}

/// In-memory registry of job status snapshots plus a bounded recent-job log.
pub struct JobRegistry {
    entries: DashMap<Uuid, Entry>,
    recent: RwLock<VecDeque<(Uuid, String)>>,
    retention: Duration,
    track_results: bool,
}

impl JobRegistry {
    /// Create a registry with the given terminal-status retention window.
    pub fn new(retention: Duration, track_results: bool) -> Self {
        Self {
            entries: DashMap::new(),
            recent: RwLock::new(VecDeque::new()),
            retention,
            track_results,
        }
    }

    /// Register a newly submitted job: a Pending snapshot plus a recent-log
    /// entry. Called by the broker before the job hits the transport.
    pub async fn insert(&self, job: &Job) {
        self.entries.insert(
            job.id,
            Entry {
                status: JobStatus::pending(job.id),
                expires_at: None,
            },
        );

        let mut recent = self.recent.write().await;
        recent.push_back((job.id, job.display_name.clone()));
        while recent.len() > RECENT_LOG_CAP {
            recent.pop_front();
        }
    }

    /// Remove a job that never made it onto the transport.
    pub async fn remove(&self, id: Uuid) {
        self.entries.remove(&id);
        self.recent.write().await.retain(|(rid, _)| *rid != id);
    }

    /// Publish a status snapshot, fully replacing the previous one.
    ///
    /// Writes that would leave a terminal state, or skip ahead in the state
    /// machine, are dropped with a warning — a crashed worker's last
    /// published snapshot stays the final visible status.
    pub fn publish(&self, status: JobStatus) {
        let Some(mut entry) = self.entries.get_mut(&status.id) else {
            warn!(job_id = %status.id, state = %status.state, "Status publish for unknown job dropped");
            return;
        };

        if !entry.status.state.can_transition_to(status.state) {
            warn!(
                job_id = %status.id,
                from = %entry.status.state,
                to = %status.state,
                "Invalid state transition dropped"
            );
            return;
        }

        let mut status = status;
        if status.state.is_terminal() {
            entry.expires_at = Some(Instant::now() + self.retention);
            if !self.track_results {
                status.result = None;
            }
        }
        entry.status = status;
    }

    /// Read the latest snapshot for a job. Returns None for unknown ids and
    /// for terminal entries past their retention deadline.
    pub fn get(&self, id: Uuid) -> Option<JobStatus> {
        let entry = self.entries.get(&id)?;
        if let Some(deadline) = entry.expires_at {
            if Instant::now() >= deadline {
                return None;
            }
        }
        Some(entry.status.clone())
    }

    /// The recent job log, most recently submitted first, truncated to `limit`.
    pub async fn recent(&self, limit: usize) -> Vec<(Uuid, String)> {
        self.recent
            .read()
            .await
            .iter()
            .rev()
            .take(limit)
            .cloned()
            .collect()
    }

    /// Drop terminal entries past their retention deadline.
    /// Returns the number of entries removed.
    pub fn expire_old(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| entry.expires_at.is_none_or(|deadline| now < deadline));
        let removed = before - self.entries.len();
        if removed > 0 {
            info!(count = removed, "Expired terminal job entries");
        }
        removed
    }

    /// Number of tracked jobs (all states).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Spawn a background task that periodically expires old terminal entries.
pub fn spawn_expiry_task(
    registry: Arc<JobRegistry>,
    interval: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(interval);
        loop {
            interval.tick().await;
            let removed = registry.expire_old();
            if removed > 0 {
                debug!(count = removed, "Expiry sweep");
            }
        }
    })
}
