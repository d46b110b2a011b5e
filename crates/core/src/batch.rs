//! Resize batch and job entities with their lifecycle state machines.
//!
//! A [`ResizeBatch`] owns one [`ResizeJob`] per target dimension. Batch
//! status and progress are always derived from the jobs, never stored as
//! independent truth, so they cannot drift when jobs change.

use serde::{Deserialize, Serialize};

use crate::design::Design;
use crate::error::CoreError;
use crate::export::ExportSettings;
use crate::platform::{Platform, PlatformDimension};
use crate::types::{Id, Timestamp};

// ---------------------------------------------------------------------------
// Job status state machine
// ---------------------------------------------------------------------------

/// Lifecycle status of a single resize job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Processing,
    Completed,
    Failed,
    /// The resized output violated hard platform constraints; a human must
    /// supply an adjusted design. The only exit is an explicit approval.
    WaitingForAdjustment,
    Cancelled,
}

impl JobStatus {
    /// Human-readable label for display.
    pub fn label(self) -> &'static str {
        match self {
            Self::Queued => "Queued",
            Self::Processing => "Processing",
            Self::Completed => "Completed",
            Self::Failed => "Failed",
            Self::WaitingForAdjustment => "Waiting for Adjustment",
            Self::Cancelled => "Cancelled",
        }
    }
}

/// Returns the set of valid target statuses reachable from `from`.
///
/// Terminal states (completed, failed, cancelled) return an empty slice.
/// Cancellation is reachable only from `Queued`: in-flight jobs run to
/// completion, there is no preemption.
pub fn valid_transitions(from: JobStatus) -> &'static [JobStatus] {
    match from {
        JobStatus::Queued => &[JobStatus::Processing, JobStatus::Cancelled],
        JobStatus::Processing => &[
            JobStatus::Completed,
            JobStatus::Failed,
            JobStatus::WaitingForAdjustment,
        ],
        JobStatus::WaitingForAdjustment => &[JobStatus::Completed],
        JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled => &[],
    }
}

/// Check whether a transition from `from` to `to` is valid.
pub fn can_transition(from: JobStatus, to: JobStatus) -> bool {
    valid_transitions(from).contains(&to)
}

/// Validate a state transition, returning a descriptive error for invalid
/// ones.
pub fn validate_transition(from: JobStatus, to: JobStatus) -> Result<(), CoreError> {
    if can_transition(from, to) {
        Ok(())
    } else {
        Err(CoreError::Conflict(format!(
            "Invalid job transition: {} -> {}",
            from.label(),
            to.label()
        )))
    }
}

// ---------------------------------------------------------------------------
// ResizeJob
// ---------------------------------------------------------------------------

/// Optional platform linkage for a job: validation runs against this
/// dimension after the resize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformBinding {
    pub platform: Platform,
    pub dimension: PlatformDimension,
}

/// One resize of the batch's source design to a single target dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResizeJob {
    pub id: Id,
    pub source_design_id: Id,
    pub target_width: u32,
    pub target_height: u32,
    pub status: JobStatus,
    pub created_at: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<Timestamp>,
    /// The produced design, set on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<Design>,
    /// Captured failure message, set when the job fails.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub binding: Option<PlatformBinding>,
    pub export_settings: ExportSettings,
    pub needs_manual_adjustment: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adjustment_reason: Option<String>,
}

impl ResizeJob {
    /// Create a queued job. Export settings default to the platform's
    /// minimum-file-size preset when a binding is present, otherwise to the
    /// generic web preset.
    pub fn new(
        source_design_id: Id,
        target_width: u32,
        target_height: u32,
        binding: Option<PlatformBinding>,
    ) -> Self {
        let export_settings = match &binding {
            Some(b) => ExportSettings::smallest_for(&b.dimension.formats),
            None => ExportSettings::web_default(),
        };
        Self {
            id: Id::new_v4(),
            source_design_id,
            target_width,
            target_height,
            status: JobStatus::Queued,
            created_at: chrono::Utc::now(),
            started_at: None,
            finished_at: None,
            output: None,
            error: None,
            binding,
            export_settings,
            needs_manual_adjustment: false,
            adjustment_reason: None,
        }
    }

    /// Queued -> Processing.
    pub fn start(&mut self) -> Result<(), CoreError> {
        validate_transition(self.status, JobStatus::Processing)?;
        self.status = JobStatus::Processing;
        self.started_at = Some(chrono::Utc::now());
        Ok(())
    }

    /// Processing -> Completed with the produced design.
    pub fn complete(&mut self, output: Design) -> Result<(), CoreError> {
        validate_transition(self.status, JobStatus::Completed)?;
        self.status = JobStatus::Completed;
        self.output = Some(output);
        self.finished_at = Some(chrono::Utc::now());
        Ok(())
    }

    /// Processing -> Failed with the captured error message.
    pub fn fail(&mut self, message: impl Into<String>) -> Result<(), CoreError> {
        validate_transition(self.status, JobStatus::Failed)?;
        self.status = JobStatus::Failed;
        self.error = Some(message.into());
        self.finished_at = Some(chrono::Utc::now());
        Ok(())
    }

    /// Processing -> WaitingForAdjustment. The candidate output is kept so
    /// a reviewer can inspect what the engine produced.
    pub fn await_adjustment(
        &mut self,
        candidate: Design,
        reason: impl Into<String>,
    ) -> Result<(), CoreError> {
        validate_transition(self.status, JobStatus::WaitingForAdjustment)?;
        self.status = JobStatus::WaitingForAdjustment;
        self.output = Some(candidate);
        self.needs_manual_adjustment = true;
        self.adjustment_reason = Some(reason.into());
        Ok(())
    }

    /// WaitingForAdjustment -> Completed with a manually corrected design.
    pub fn approve_adjustment(&mut self, adjusted: Design) -> Result<(), CoreError> {
        if self.status != JobStatus::WaitingForAdjustment {
            return Err(CoreError::Conflict(format!(
                "Job {} is not waiting for adjustment (status: {})",
                self.id,
                self.status.label()
            )));
        }
        validate_transition(self.status, JobStatus::Completed)?;
        self.status = JobStatus::Completed;
        self.output = Some(adjusted);
        self.needs_manual_adjustment = false;
        self.finished_at = Some(chrono::Utc::now());
        Ok(())
    }

    /// Queued -> Cancelled.
    pub fn cancel(&mut self) -> Result<(), CoreError> {
        validate_transition(self.status, JobStatus::Cancelled)?;
        self.status = JobStatus::Cancelled;
        self.finished_at = Some(chrono::Utc::now());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// ResizeBatch
// ---------------------------------------------------------------------------

/// Aggregate batch status, derived from job statuses by fixed precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    Queued,
    Processing,
    Completed,
    Failed,
    WaitingForAdjustment,
    Cancelled,
}

/// A fan-out of one source design to N target dimensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResizeBatch {
    pub id: Id,
    pub name: String,
    /// Read-only source: jobs only ever read it, the engine emits new
    /// designs.
    pub source_design: Design,
    pub jobs: Vec<ResizeJob>,
    pub created_at: Timestamp,
}

impl ResizeBatch {
    pub fn new(name: impl Into<String>, source_design: Design, jobs: Vec<ResizeJob>) -> Self {
        Self {
            id: Id::new_v4(),
            name: name.into(),
            source_design,
            jobs,
            created_at: chrono::Utc::now(),
        }
    }

    /// Derived batch status. Precedence, first match wins: any job waiting
    /// for adjustment; any job processing; all completed; all cancelled;
    /// any failed; otherwise queued.
    pub fn status(&self) -> BatchStatus {
        let jobs = &self.jobs;
        if jobs
            .iter()
            .any(|j| j.status == JobStatus::WaitingForAdjustment)
        {
            BatchStatus::WaitingForAdjustment
        } else if jobs.iter().any(|j| j.status == JobStatus::Processing) {
            BatchStatus::Processing
        } else if !jobs.is_empty() && jobs.iter().all(|j| j.status == JobStatus::Completed) {
            BatchStatus::Completed
        } else if !jobs.is_empty() && jobs.iter().all(|j| j.status == JobStatus::Cancelled) {
            BatchStatus::Cancelled
        } else if jobs.iter().any(|j| j.status == JobStatus::Failed) {
            BatchStatus::Failed
        } else {
            BatchStatus::Queued
        }
    }

    /// Completed fraction in `0.0..=1.0`. Zero for an empty batch.
    pub fn progress(&self) -> f64 {
        if self.jobs.is_empty() {
            return 0.0;
        }
        let completed = self
            .jobs
            .iter()
            .filter(|j| j.status == JobStatus::Completed)
            .count();
        completed as f64 / self.jobs.len() as f64
    }

    pub fn job(&self, job_id: Id) -> Option<&ResizeJob> {
        self.jobs.iter().find(|j| j.id == job_id)
    }

    pub fn job_mut(&mut self, job_id: Id) -> Option<&mut ResizeJob> {
        self.jobs.iter_mut().find(|j| j.id == job_id)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
