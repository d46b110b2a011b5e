use retarget_core::error::CoreError;
use retarget_core::types::Id;

use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Batch not found: {0}")]
    BatchNotFound(Id),

    #[error("Job not found: {0}")]
    JobNotFound(Id),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
