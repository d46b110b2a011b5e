//! Batch resize pipeline.
//!
//! Wires the pure core (smart resize engine + constraint checker) into an
//! async orchestrator:
//!
//! - [`BatchOrchestrator`] — batch creation, bounded-concurrency
//!   processing, cancellation, and the manual-adjustment recovery path.
//! - [`DesignStore`] — repository boundary for design persistence; the
//!   pipeline itself performs no file I/O.
//! - Events are published on a [`retarget_events::EventBus`] as jobs move
//!   through their lifecycle.

pub mod error;
pub mod orchestrator;
pub mod store;

pub use error::PipelineError;
pub use orchestrator::{BatchOrchestrator, OrchestratorConfig, ResizeTarget};
pub use store::{DesignStore, InMemoryDesignStore, StoreError};
