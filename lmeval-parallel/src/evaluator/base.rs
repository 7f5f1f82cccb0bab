use crate::{eval_with_funcs, n_workers, EvalStats, EvaluatorConfig, TrainerContext};
use anyhow::Result;
use lmeval_core::{error::EvalError, Env, Predictor};
use log::info;
use std::{
    sync::Arc,
    time::{Duration, Instant},
};

/// A hook invoked by a training loop.
pub trait Callback<E: Env> {
    /// Called once before training starts.
    fn setup(&mut self, ctx: &mut dyn TrainerContext<E>) -> Result<()>;

    /// Called periodically during training.
    fn trigger(&mut self, ctx: &mut dyn TrainerContext<E>) -> Result<()>;
}

/// The number of episodes of the next evaluation.
///
/// If the last evaluation took longer than `limit`, the budget shrinks to
/// `floor(budget * decay)`. Otherwise it is unchanged.
pub fn next_eval_budget(budget: usize, elapsed: Duration, limit: Duration, decay: f64) -> usize {
    if elapsed > limit {
        (budget as f64 * decay) as usize
    } else {
        budget
    }
}

/// Evaluates the model being trained on every trigger.
///
/// Records `mean_score`, `max_score`, `mean_distance` and `max_distance`
/// with [`TrainerContext::put_scalar`].
pub struct Evaluator<E: Env> {
    config: EvaluatorConfig,
    env_config: E::Config,

    /// The number of episodes of the next evaluation.
    eval_episodes: usize,

    /// One handle per worker, all sharing the predictor built in `setup`.
    pred_funcs: Vec<Arc<dyn Predictor<E::Obs>>>,

    last_stats: Option<EvalStats>,
}

impl<E> Evaluator<E>
where
    E: Env + 'static,
    E::Config: Send + 'static,
{
    /// Constructs an [`Evaluator`]. Workers are not created until [`Callback::setup`].
    pub fn new(config: EvaluatorConfig, env_config: E::Config) -> Self {
        Self {
            eval_episodes: config.nr_eval,
            config,
            env_config,
            pred_funcs: vec![],
            last_stats: None,
        }
    }

    /// The number of episodes the next trigger will run.
    pub fn eval_episodes(&self) -> usize {
        self.eval_episodes
    }

    /// The number of workers, zero before setup.
    pub fn n_workers(&self) -> usize {
        self.pred_funcs.len()
    }

    /// Results of the last trigger.
    pub fn last_stats(&self) -> Option<&EvalStats> {
        self.last_stats.as_ref()
    }
}

impl<E> Callback<E> for Evaluator<E>
where
    E: Env + 'static,
    E::Config: Send + 'static,
{
    fn setup(&mut self, ctx: &mut dyn TrainerContext<E>) -> Result<()> {
        let n = n_workers(self.config.max_workers);
        let predictor = ctx.get_predictor(&self.config.input_names, &self.config.output_names)?;
        self.pred_funcs = vec![predictor; n];
        info!("Evaluator uses {} workers", n);
        Ok(())
    }

    fn trigger(&mut self, ctx: &mut dyn TrainerContext<E>) -> Result<()> {
        if self.pred_funcs.is_empty() {
            return Err(EvalError::NotSetUp.into());
        }

        let time = Instant::now();
        let stats = eval_with_funcs::<E>(
            &self.pred_funcs,
            self.eval_episodes,
            &self.env_config,
            &self.config.parallel,
        )?;
        let elapsed = time.elapsed();

        let budget = next_eval_budget(
            self.eval_episodes,
            elapsed,
            self.config.time_limit(),
            self.config.decay,
        );
        if budget != self.eval_episodes {
            info!(
                "Evaluation took {:.1} sec, reducing episodes from {} to {}",
                elapsed.as_secs_f32(),
                self.eval_episodes,
                budget
            );
            self.eval_episodes = budget;
        }

        ctx.put_scalar("mean_score", stats.mean_score);
        ctx.put_scalar("max_score", stats.max_score);
        ctx.put_scalar("mean_distance", stats.mean_distance);
        ctx.put_scalar("max_distance", stats.max_distance);
        info!(
            "Step {}: mean_score {}, max_score {}, mean_distance {}, max_distance {}",
            ctx.global_step(),
            stats.mean_score,
            stats.max_score,
            stats.mean_distance,
            stats.max_distance
        );
        self.last_stats = Some(stats);

        Ok(())
    }
}
