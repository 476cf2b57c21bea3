use rd_core::ReactionId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReactError {
    /// A scheduled rate update pushed a reaction's total probability past the
    /// configured threshold under `OverprobPolicy::Error`.  The driver flushes
    /// pending output before stopping.
    #[error(
        "reaction {reaction} total probability {total} exceeds threshold {threshold}"
    )]
    ProbabilityOverflow {
        reaction: ReactionId,
        total: f64,
        threshold: f64,
    },

    #[error("reaction table configuration error: {0}")]
    Config(String),
}

pub type ReactResult<T> = Result<T, ReactError>;
