#![warn(missing_docs)]
//! Core components of the evaluation harness.
//!
//! * [`Env`] and [`Predictor`] are the seams to the simulator and to the
//!   neural network runtime. Neither is implemented here.
//! * [`play_one_episode`] and [`play_n_episodes`] run greedy rollouts on a
//!   single thread.
//! * [`StatCounter`] aggregates per-episode scalars.
//! * [`record`] holds the key-value records written to a [`Recorder`](record::Recorder).
pub mod error;
pub mod grid;
pub mod record;

mod base;
pub use base::{Env, LandmarkInfo, Predictor, Step};

mod runner;
pub use runner::{
    greedy_action, play_n_episodes, play_one_episode, save_episode_rows, write_episode_rows,
    EpisodeResult, EpisodeRow, EPISODE_ROW_HEADER,
};

mod stat;
pub use stat::StatCounter;
