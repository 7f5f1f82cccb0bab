//! Environment.
use super::Step;
use anyhow::Result;
use std::fmt::Debug;

/// Represents an environment on which a trained agent is evaluated.
///
/// Actions are indices into the action-value vector returned by a
/// [`Predictor`](super::Predictor). The action values themselves are passed to
/// [`Env::step`] as well, so that the environment can use them, e.g., for
/// oscillation detection.
pub trait Env {
    /// Configurations.
    type Config: Clone;

    /// Observation of the environment.
    type Obs: Clone + Debug;

    /// Builds an environment with a given random seed.
    fn build(config: &Self::Config, seed: i64) -> Result<Self>
    where
        Self: Sized;

    /// Starts a new episode and returns the initial observation.
    fn reset(&mut self) -> Result<Self::Obs>;

    /// Performes an environment step.
    fn step(&mut self, act: usize, q_values: &[f32]) -> Result<Step<Self>>
    where
        Self: Sized;

    /// Renders the current state. Does nothing by default.
    fn render(&mut self) -> Result<()> {
        Ok(())
    }
}
