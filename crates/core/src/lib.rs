//! Core domain logic for design retargeting.
//!
//! Pure building blocks with zero internal dependencies:
//!
//! - [`design`] — canvas/element data model.
//! - [`geometry`] — scale factors, bounding boxes, containment.
//! - [`strategy`] — per-element resize policy (importance, type, constraints).
//! - [`engine`] — whole-design smart resize.
//! - [`platform`] / [`export`] — platform catalog and export settings.
//! - [`checker`] — constraint validation and file-size estimation.
//! - [`batch`] — resize job/batch entities and their state machines.
//!
//! Everything here is value-oriented and side-effect free (the single
//! exception is [`checker::validate_file`], which inspects an exported
//! artifact on disk). Persistence and scheduling live in the pipeline crate.

pub mod batch;
pub mod checker;
pub mod design;
pub mod engine;
pub mod error;
pub mod export;
pub mod geometry;
pub mod platform;
pub mod strategy;
pub mod types;

pub use batch::{BatchStatus, JobStatus, PlatformBinding, ResizeBatch, ResizeJob};
pub use checker::{ConstraintViolation, ViolationSeverity};
pub use design::{Design, DesignElement, ElementConstraints, ElementImportance, ElementType};
pub use error::CoreError;
pub use export::{ExportFormat, ExportSettings, PngColorMode};
pub use platform::{Platform, PlatformDimension, RequirementLevel, SafeZoneInsets};
