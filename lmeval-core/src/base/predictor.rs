//! Predictor.
use anyhow::Result;

/// Maps observations to action values.
///
/// Implementations wrap a trained model. Inference must not mutate the
/// predictor as seen by the caller: a single instance is shared by all
/// evaluation workers through an [`Arc`](std::sync::Arc).
pub trait Predictor<O>: Send + Sync {
    /// Computes action values for a batch of observations.
    ///
    /// The returned vector has one row per observation.
    fn predict_batch(&self, obs: &[O]) -> Result<Vec<Vec<f32>>>;

    /// Computes action values for a single observation.
    fn predict(&self, obs: &O) -> Result<Vec<f32>> {
        let mut out = self.predict_batch(std::slice::from_ref(obs))?;
        anyhow::ensure!(!out.is_empty(), "predictor returned an empty batch");
        Ok(out.swap_remove(0))
    }
}

impl<O, P> Predictor<O> for std::sync::Arc<P>
where
    P: Predictor<O> + ?Sized,
{
    fn predict_batch(&self, obs: &[O]) -> Result<Vec<Vec<f32>>> {
        (**self).predict_batch(obs)
    }
}
