use rd_core::RdError;
use rd_react::ReactError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalkError {
    #[error("grid operation failed: {0}")]
    Grid(#[from] RdError),

    #[error("reaction sampling failed: {0}")]
    React(#[from] ReactError),
}

pub type WalkResult<T> = Result<T, WalkError>;
