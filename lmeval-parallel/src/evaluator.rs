//! Periodic evaluation during training.
mod base;
mod config;
mod context;
pub use base::{next_eval_budget, Callback, Evaluator};
pub use config::EvaluatorConfig;
pub use context::{RecorderContext, TrainerContext};
