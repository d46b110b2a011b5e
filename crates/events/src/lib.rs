//! Event infrastructure for the resize pipeline.
//!
//! - [`EventBus`] — in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`ResizeEvent`] — the canonical pipeline event envelope
//!   (`batch.created`, `job.completed`, `job.waiting_for_adjustment`, ...).

pub mod bus;

pub use bus::{EventBus, ResizeEvent};
