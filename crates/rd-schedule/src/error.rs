use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScheduleError {
    /// The wheel hierarchy would need more than `MAX_CASCADE_DEPTH` levels to
    /// cover the requested horizon — almost always a misconfigured `dt_min`.
    #[error(
        "scheduler cascade depth exceeded: dt_min = {dt_min:e}, dt_max = {dt_max:e} \
         (check that dt_min is not orders of magnitude too small for the horizon)"
    )]
    CascadeDepth { dt_min: f64, dt_max: f64 },

    #[error("scheduler configuration error: {0}")]
    Config(String),
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;
