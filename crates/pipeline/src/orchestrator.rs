//! Batch resize orchestrator.
//!
//! Fans a single source design out to N target dimensions as independent
//! jobs, runs them with bounded concurrency, and finalizes each job against
//! the platform constraint checker. The batch registry is the only shared
//! mutable state in the pipeline; every mutation goes through one async
//! mutex so concurrent job completions cannot lose updates.

use std::collections::HashMap;
use std::sync::Arc;

use retarget_core::batch::{JobStatus, PlatformBinding, ResizeBatch, ResizeJob};
use retarget_core::checker::{self, ViolationSeverity};
use retarget_core::design::Design;
use retarget_core::engine;
use retarget_core::error::CoreError;
use retarget_core::export::ExportSettings;
use retarget_core::types::Id;
use retarget_events::{EventBus, ResizeEvent};
use tokio::sync::{Mutex, Semaphore};
use tracing::{error, info, warn};

use crate::error::PipelineError;
use crate::store::DesignStore;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Default ceiling on simultaneously processing jobs.
pub const DEFAULT_MAX_CONCURRENT_JOBS: usize = 4;

/// Orchestrator tuning knobs, injected at construction.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Maximum number of jobs performing resize/validate work at once.
    /// The limiter is process-wide for this orchestrator instance: jobs
    /// from concurrently processing batches share it, so running many
    /// batches cannot oversubscribe the host.
    pub max_concurrent_jobs: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_concurrent_jobs: DEFAULT_MAX_CONCURRENT_JOBS,
        }
    }
}

// ---------------------------------------------------------------------------
// Targets
// ---------------------------------------------------------------------------

/// One requested output dimension for a batch, optionally tied to a
/// platform dimension and carrying explicit export settings.
#[derive(Debug, Clone)]
pub struct ResizeTarget {
    pub width: u32,
    pub height: u32,
    pub binding: Option<PlatformBinding>,
    /// Overrides the preset chosen from the binding when set.
    pub export_settings: Option<ExportSettings>,
}

impl ResizeTarget {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            binding: None,
            export_settings: None,
        }
    }

    pub fn with_binding(mut self, binding: PlatformBinding) -> Self {
        self.binding = Some(binding);
        self
    }

    pub fn with_export_settings(mut self, settings: ExportSettings) -> Self {
        self.export_settings = Some(settings);
        self
    }
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// Coordinates batch creation, bounded-concurrency processing, cancellation,
/// and the manual-adjustment recovery path.
///
/// Shared via `Arc` across callers; all methods take `&self`.
pub struct BatchOrchestrator {
    batches: Arc<Mutex<HashMap<Id, ResizeBatch>>>,
    store: Arc<dyn DesignStore>,
    bus: Arc<EventBus>,
    limiter: Arc<Semaphore>,
}

impl BatchOrchestrator {
    pub fn new(store: Arc<dyn DesignStore>, bus: Arc<EventBus>, config: OrchestratorConfig) -> Self {
        Self {
            batches: Arc::new(Mutex::new(HashMap::new())),
            store,
            bus,
            limiter: Arc::new(Semaphore::new(config.max_concurrent_jobs.max(1))),
        }
    }

    /// Create a batch with one queued job per target.
    ///
    /// The source design is persisted through the store before any job can
    /// reference it. Returns a snapshot of the created batch.
    pub async fn create_batch(
        &self,
        name: impl Into<String>,
        source: Design,
        targets: Vec<ResizeTarget>,
    ) -> Result<ResizeBatch, PipelineError> {
        if targets.is_empty() {
            return Err(
                CoreError::Validation("A batch needs at least one target dimension".into()).into(),
            );
        }

        self.store.save(&source).await?;

        let jobs: Vec<ResizeJob> = targets
            .into_iter()
            .map(|t| {
                let mut job = ResizeJob::new(source.id, t.width, t.height, t.binding);
                if let Some(settings) = t.export_settings {
                    job.export_settings = settings;
                }
                job
            })
            .collect();

        let batch = ResizeBatch::new(name, source, jobs);
        let snapshot = batch.clone();

        self.batches.lock().await.insert(batch.id, batch);

        info!(batch_id = %snapshot.id, jobs = snapshot.jobs.len(), "batch created");
        self.bus.publish(
            ResizeEvent::new("batch.created")
                .with_batch(snapshot.id)
                .with_payload(serde_json::json!({ "jobs": snapshot.jobs.len() })),
        );

        Ok(snapshot)
    }

    /// Run every queued job of the batch to a terminal or waiting state.
    ///
    /// Jobs run as independent tasks gated by the shared concurrency
    /// limiter; a failure in one job never aborts its siblings. Returns
    /// once every job of the batch has settled.
    pub async fn process_batch(&self, batch_id: Id) -> Result<(), PipelineError> {
        let (source, specs) = {
            let batches = self.batches.lock().await;
            let batch = batches
                .get(&batch_id)
                .ok_or(PipelineError::BatchNotFound(batch_id))?;
            let specs: Vec<JobSpec> = batch
                .jobs
                .iter()
                .filter(|j| j.status == JobStatus::Queued)
                .map(|j| JobSpec {
                    job_id: j.id,
                    width: j.target_width,
                    height: j.target_height,
                    binding: j.binding.clone(),
                    export_settings: j.export_settings.clone(),
                })
                .collect();
            (batch.source_design.clone(), specs)
        };

        info!(batch_id = %batch_id, jobs = specs.len(), "processing batch");

        let mut handles = Vec::with_capacity(specs.len());
        for spec in specs {
            let registry = Arc::clone(&self.batches);
            let store = Arc::clone(&self.store);
            let bus = Arc::clone(&self.bus);
            let limiter = Arc::clone(&self.limiter);
            let source = source.clone();
            handles.push(tokio::spawn(async move {
                run_job(registry, store, bus, limiter, batch_id, spec, source).await;
            }));
        }

        for handle in handles {
            // Task panics are job-local by construction; a join error here
            // means the runtime is shutting down.
            let _ = handle.await;
        }

        Ok(())
    }

    /// Cancel all still-queued jobs of a batch. Jobs already processing run
    /// to completion; terminal jobs are untouched. Returns the number of
    /// jobs cancelled.
    pub async fn cancel_batch(&self, batch_id: Id) -> Result<usize, PipelineError> {
        let mut batches = self.batches.lock().await;
        let batch = batches
            .get_mut(&batch_id)
            .ok_or(PipelineError::BatchNotFound(batch_id))?;

        let mut cancelled = 0;
        for job in &mut batch.jobs {
            if job.status == JobStatus::Queued {
                job.cancel()?;
                cancelled += 1;
            }
        }

        info!(batch_id = %batch_id, cancelled, "batch cancelled");
        self.bus.publish(
            ResizeEvent::new("batch.cancelled")
                .with_batch(batch_id)
                .with_payload(serde_json::json!({ "cancelled_jobs": cancelled })),
        );

        Ok(cancelled)
    }

    /// Approve a manual adjustment for a job waiting on one.
    ///
    /// The supplied design replaces the rejected engine output, is persisted
    /// through the store, and moves the job to completed — the only way out
    /// of the waiting state.
    pub async fn approve_manual_adjustment(
        &self,
        job_id: Id,
        adjusted: Design,
    ) -> Result<(), PipelineError> {
        self.store.save(&adjusted).await?;

        let mut batches = self.batches.lock().await;
        let batch = batches
            .values_mut()
            .find(|b| b.job(job_id).is_some())
            .ok_or(PipelineError::JobNotFound(job_id))?;
        let batch_id = batch.id;
        let job = batch
            .job_mut(job_id)
            .ok_or(PipelineError::JobNotFound(job_id))?;

        job.approve_adjustment(adjusted)?;

        info!(batch_id = %batch_id, job_id = %job_id, "manual adjustment approved");
        self.bus.publish(
            ResizeEvent::new("job.adjustment_approved")
                .with_batch(batch_id)
                .with_job(job_id),
        );

        Ok(())
    }

    /// Snapshot of one batch.
    pub async fn batch(&self, batch_id: Id) -> Option<ResizeBatch> {
        self.batches.lock().await.get(&batch_id).cloned()
    }

    /// Snapshot of all known batches.
    pub async fn batches(&self) -> Vec<ResizeBatch> {
        self.batches.lock().await.values().cloned().collect()
    }

    /// Batches that still need attention: queued, processing, or waiting
    /// for a manual adjustment.
    pub async fn active_batches(&self) -> Vec<ResizeBatch> {
        use retarget_core::batch::BatchStatus;
        self.batches
            .lock()
            .await
            .values()
            .filter(|b| {
                matches!(
                    b.status(),
                    BatchStatus::Queued | BatchStatus::Processing | BatchStatus::WaitingForAdjustment
                )
            })
            .cloned()
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Per-job worker
// ---------------------------------------------------------------------------

/// Immutable job parameters captured at dispatch time.
struct JobSpec {
    job_id: Id,
    width: u32,
    height: u32,
    binding: Option<PlatformBinding>,
    export_settings: ExportSettings,
}

/// Run one job to a settled state: resize, validate, finalize.
///
/// The registry lock is held only for status flips, never across the resize
/// computation or store I/O.
async fn run_job(
    registry: Arc<Mutex<HashMap<Id, ResizeBatch>>>,
    store: Arc<dyn DesignStore>,
    bus: Arc<EventBus>,
    limiter: Arc<Semaphore>,
    batch_id: Id,
    spec: JobSpec,
    source: Design,
) {
    // Suspend until a concurrency slot is free. The semaphore is never
    // closed, so acquisition only fails during runtime teardown.
    let Ok(_permit) = limiter.acquire_owned().await else {
        return;
    };

    // The job may have been cancelled while waiting for a slot.
    {
        let mut batches = registry.lock().await;
        let Some(job) = batches
            .get_mut(&batch_id)
            .and_then(|b| b.job_mut(spec.job_id))
        else {
            return;
        };
        if job.status != JobStatus::Queued || job.start().is_err() {
            return;
        }
    }
    bus.publish(
        ResizeEvent::new("job.started")
            .with_batch(batch_id)
            .with_job(spec.job_id)
            .with_payload(serde_json::json!({
                "target": format!("{}x{}", spec.width, spec.height),
            })),
    );

    let outcome = engine::resize(&source, f64::from(spec.width), f64::from(spec.height));

    match outcome {
        Err(err) => {
            warn!(batch_id = %batch_id, job_id = %spec.job_id, %err, "resize failed");
            finalize(&registry, &bus, batch_id, spec.job_id, |job| {
                job.fail(err.to_string())
            })
            .await;
        }
        Ok(output) => {
            let violations = match &spec.binding {
                Some(binding) => checker::validate(
                    &output,
                    &binding.platform,
                    &binding.dimension,
                    &spec.export_settings,
                ),
                None => Vec::new(),
            };

            if checker::has_errors(&violations) {
                let reason = violations
                    .iter()
                    .filter(|v| v.severity == ViolationSeverity::Error)
                    .map(|v| v.message.as_str())
                    .collect::<Vec<_>>()
                    .join("; ");
                warn!(batch_id = %batch_id, job_id = %spec.job_id, %reason, "job needs manual adjustment");
                finalize(&registry, &bus, batch_id, spec.job_id, |job| {
                    job.await_adjustment(output, reason)
                })
                .await;
            } else if let Err(err) = store.save(&output).await {
                error!(batch_id = %batch_id, job_id = %spec.job_id, %err, "failed to persist output design");
                finalize(&registry, &bus, batch_id, spec.job_id, |job| {
                    job.fail(err.to_string())
                })
                .await;
            } else {
                finalize(&registry, &bus, batch_id, spec.job_id, |job| {
                    job.complete(output)
                })
                .await;
            }
        }
    }
}

/// Apply a terminal transition to a job under the registry lock and publish
/// the matching event.
async fn finalize<F>(
    registry: &Mutex<HashMap<Id, ResizeBatch>>,
    bus: &EventBus,
    batch_id: Id,
    job_id: Id,
    transition: F,
) where
    F: FnOnce(&mut ResizeJob) -> Result<(), CoreError>,
{
    let status = {
        let mut batches = registry.lock().await;
        let Some(job) = batches.get_mut(&batch_id).and_then(|b| b.job_mut(job_id)) else {
            return;
        };
        if let Err(err) = transition(job) {
            error!(batch_id = %batch_id, job_id = %job_id, %err, "invalid job transition");
            return;
        }
        job.status
    };

    let event_type = match status {
        JobStatus::Completed => "job.completed",
        JobStatus::Failed => "job.failed",
        JobStatus::WaitingForAdjustment => "job.waiting_for_adjustment",
        _ => return,
    };
    bus.publish(ResizeEvent::new(event_type).with_batch(batch_id).with_job(job_id));
}
