//! Parallel evaluation of trained predictors.
//!
//! Each predictor replica drives its own environment on a worker thread.
//! Workers push episode scores and distance errors into two shared channels,
//! drained by the calling thread.
//!
//! * [`eval_with_funcs`] runs a fixed number of episodes with a set of predictors.
//! * [`eval_model_multithread`] picks the number of workers from the available
//!   parallelism.
//! * [`Evaluator`] is a [`Callback`] invoked periodically by a training loop.
mod config;
mod eval;
mod evaluator;
mod stop;
mod worker;
pub use config::ParallelEvalConfig;
pub use eval::{eval_model_multithread, eval_with_funcs, n_workers, EvalStats};
pub use evaluator::{
    next_eval_budget, Callback, Evaluator, EvaluatorConfig, RecorderContext, TrainerContext,
};
pub use stop::{send_stoppable, StopFlag, StoppablePredictor};
pub use worker::{worker_stats_fmt, Worker, WorkerChannels, WorkerPool, WorkerStat};
