use rd_core::RdError;
use rd_react::ReactError;
use rd_schedule::ScheduleError;
use rd_walk::WalkError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error("grid operation failed: {0}")]
    Grid(#[from] RdError),

    #[error("reaction sampling failed: {0}")]
    React(#[from] ReactError),

    #[error("scheduling failed: {0}")]
    Schedule(#[from] ScheduleError),

    #[error("diffusion step failed: {0}")]
    Walk(#[from] WalkError),
}

pub type SimResult<T> = Result<T, SimError>;
