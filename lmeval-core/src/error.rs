//! Errors in the library.
use thiserror::Error;

/// Errors in the library.
#[derive(Error, Debug)]
pub enum EvalError {
    /// A worker observed the stop flag.
    ///
    /// This is how a worker leaves its loop; it is never returned to the caller
    /// of a parallel evaluation.
    #[error("stopped")]
    Stopped,

    /// Record key error.
    #[error("Record key error: {0}")]
    RecordKeyError(String),

    /// A worker thread failed while playing an episode.
    #[error("Worker {id} failed: {message}")]
    WorkerFailed {
        /// Index of the worker.
        id: usize,

        /// Error reported by the worker.
        message: String,
    },

    /// All workers went away before the requested number of episodes was collected.
    #[error("All workers disconnected after {0} episodes")]
    WorkersDisconnected(usize),

    /// Parallel evaluation was requested with an empty set of predictors.
    #[error("No predictors given")]
    NoPredictors,

    /// A callback was triggered before it was set up.
    #[error("Callback triggered before setup")]
    NotSetUp,
}

impl EvalError {
    /// Returns `true` if `err` wraps [`EvalError::Stopped`].
    pub fn is_stopped(err: &anyhow::Error) -> bool {
        matches!(err.downcast_ref::<EvalError>(), Some(EvalError::Stopped))
    }
}
