use anyhow::Result;
use lmeval_core::{
    record::{Record, Recorder},
    Env, Predictor,
};
use std::sync::Arc;

/// The training framework as seen from a [`Callback`](crate::Callback).
pub trait TrainerContext<E: Env> {
    /// Builds a predictor from the model being trained.
    ///
    /// `input_names` and `output_names` select the tensors of the model the
    /// predictor feeds and fetches.
    fn get_predictor(
        &mut self,
        input_names: &[String],
        output_names: &[String],
    ) -> Result<Arc<dyn Predictor<E::Obs>>>;

    /// The current training step.
    fn global_step(&self) -> usize;

    /// Records a scalar metric at the current training step.
    fn put_scalar(&mut self, name: &str, value: f32);
}

/// A [`TrainerContext`] backed by a fixed predictor and a [`Recorder`].
///
/// Every scalar is written as a [`Record`] tagged with the current step.
/// Useful to run an [`Evaluator`](crate::Evaluator) outside of a training loop.
pub struct RecorderContext<E: Env, R: Recorder> {
    predictor: Arc<dyn Predictor<E::Obs>>,
    recorder: R,
    global_step: usize,
}

impl<E: Env, R: Recorder> RecorderContext<E, R> {
    /// Creates a context starting at step 0.
    pub fn new(predictor: Arc<dyn Predictor<E::Obs>>, recorder: R) -> Self {
        Self {
            predictor,
            recorder,
            global_step: 0,
        }
    }

    /// Sets the current training step.
    pub fn set_global_step(&mut self, step: usize) {
        self.global_step = step;
    }

    /// Returns the recorder.
    pub fn recorder(&self) -> &R {
        &self.recorder
    }

    /// Consumes the context and returns the recorder.
    pub fn into_recorder(self) -> R {
        self.recorder
    }
}

impl<E: Env, R: Recorder> TrainerContext<E> for RecorderContext<E, R> {
    fn get_predictor(
        &mut self,
        _input_names: &[String],
        _output_names: &[String],
    ) -> Result<Arc<dyn Predictor<E::Obs>>> {
        Ok(self.predictor.clone())
    }

    fn global_step(&self) -> usize {
        self.global_step
    }

    fn put_scalar(&mut self, name: &str, value: f32) {
        self.recorder
            .write(Record::from_scalar(name, value).with_step(self.global_step));
    }
}
