#![warn(missing_docs)]
//! Evaluation harness for reinforcement learning agents localising landmarks
//! in 3D images.
//!
//! The harness consists of the crates below:
//!
//! * [lmeval-core](lmeval_core) provides the [`Env`](lmeval_core::Env) and
//!   [`Predictor`](lmeval_core::Predictor) traits, the single-threaded episode
//!   runner ([`play_n_episodes`](lmeval_core::play_n_episodes)) and records.
//! * [lmeval-parallel](lmeval_parallel) runs episodes on a pool of worker
//!   threads ([`eval_with_funcs`](lmeval_parallel::eval_with_funcs)) and
//!   provides the [`Evaluator`](lmeval_parallel::Evaluator) callback.
//! * [lmeval-tensorboard](lmeval_tensorboard) writes metrics for TensorBoard.
//!
//! Both the model and the simulator are supplied by the user:
//!
//! ```no_run
//! use lmeval::{
//!     eval_model_multithread,
//!     grid::{GridEnv, GridEnvConfig, GridObs, OraclePredictor},
//!     ParallelEvalConfig, Predictor,
//! };
//! use std::sync::Arc;
//!
//! # fn main() -> anyhow::Result<()> {
//! let predictor: Arc<dyn Predictor<GridObs>> = Arc::new(OraclePredictor::default());
//! let stats = eval_model_multithread::<GridEnv>(
//!     predictor,
//!     100,
//!     &GridEnvConfig::default(),
//!     &ParallelEvalConfig::default(),
//! )?;
//! println!("{:?}", stats);
//! # Ok(())
//! # }
//! ```
pub mod cli;

pub use lmeval_core::*;
pub use lmeval_parallel::*;
pub use lmeval_tensorboard::TensorboardRecorder;
