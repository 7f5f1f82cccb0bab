//! Parallel evaluation.
use crate::{worker_stats_fmt, ParallelEvalConfig, WorkerChannels, WorkerPool};
use anyhow::Result;
use crossbeam_channel::select;
use indicatif::{ProgressBar, ProgressStyle};
use lmeval_core::{error::EvalError, Env, Predictor, StatCounter};
use log::{debug, info};
use std::sync::Arc;

/// Aggregated results of an evaluation run.
///
/// All fields are zero when no episode was collected.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EvalStats {
    /// Mean of episode scores.
    pub mean_score: f32,

    /// Maximum of episode scores.
    pub max_score: f32,

    /// Mean of final distance errors.
    pub mean_distance: f32,

    /// Maximum of final distance errors.
    pub max_distance: f32,

    /// The number of scores collected, including those drained after stop.
    pub n_scores: usize,

    /// The number of distance errors collected, including those drained after stop.
    pub n_distances: usize,
}

impl EvalStats {
    /// Builds stats from the counters of scores and distance errors.
    pub fn from_counters(score: &StatCounter, dist: &StatCounter) -> Self {
        if score.count() == 0 {
            return Self::default();
        }
        Self {
            mean_score: score.average().unwrap_or(0.0),
            max_score: score.max().unwrap_or(0.0),
            mean_distance: dist.average().unwrap_or(0.0),
            max_distance: dist.max().unwrap_or(0.0),
            n_scores: score.count(),
            n_distances: dist.count(),
        }
    }

    /// `(mean score, max score, mean distance, max distance)`.
    pub fn as_tuple(&self) -> (f32, f32, f32, f32) {
        (
            self.mean_score,
            self.max_score,
            self.mean_distance,
            self.max_distance,
        )
    }
}

/// Half of the available parallelism, capped at `max` and at least 1.
pub fn n_workers(max: usize) -> usize {
    let n = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    (n / 2).min(max).max(1)
}

fn progress_bar(len: usize, show: bool) -> ProgressBar {
    if !show {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(len as u64);
    let style = ProgressStyle::with_template(
        "{elapsed_precise} [{bar:40}] {pos}/{len} episodes, eta {eta}",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb
}

/// The error to report when the score channel disconnected or a worker reported a failure.
fn worker_error(channels: &WorkerChannels, n_collected: usize) -> anyhow::Error {
    match channels.errors.try_recv() {
        Ok((id, e)) => EvalError::WorkerFailed {
            id,
            message: format!("{:#}", e),
        }
        .into(),
        Err(_) => EvalError::WorkersDisconnected(n_collected).into(),
    }
}

/// Receives `nr_eval` pairs of score and distance error.
fn collect(
    channels: &WorkerChannels,
    nr_eval: usize,
    score_stat: &mut StatCounter,
    dist_stat: &mut StatCounter,
    pb: &ProgressBar,
) -> Result<()> {
    for _ in 0..nr_eval {
        let score = select! {
            recv(channels.scores) -> msg => msg.ok(),
            recv(channels.errors) -> msg => match msg {
                Ok((id, e)) => {
                    return Err(EvalError::WorkerFailed { id, message: format!("{:#}", e) }.into())
                }
                // Every worker has exited; take what is still buffered.
                Err(_) => channels.scores.recv().ok(),
            },
        };
        let score = match score {
            Some(score) => score,
            None => return Err(worker_error(channels, score_stat.count())),
        };
        score_stat.feed(score);

        let dist = channels
            .distances
            .recv()
            .map_err(|_| worker_error(channels, score_stat.count()))?;
        dist_stat.feed(dist);
        pb.inc(1);
    }
    Ok(())
}

/// Runs episodes in parallel, returning statistics about the model performance.
///
/// One worker is started per predictor, each with its own environment built
/// from `env_config`. The calling thread collects `nr_eval` results, then stops
/// and joins the workers and drains the results they pushed in the meantime.
///
/// `nr_eval == 0` returns zeros without starting any worker.
///
/// # Errors
///
/// Returns [`EvalError::WorkerFailed`] if a worker fails, after stopping the
/// others, and [`EvalError::WorkersDisconnected`] if all workers exited
/// without reporting an error.
pub fn eval_with_funcs<E>(
    predictors: &[Arc<dyn Predictor<E::Obs>>],
    nr_eval: usize,
    env_config: &E::Config,
    config: &ParallelEvalConfig,
) -> Result<EvalStats>
where
    E: Env + 'static,
    E::Config: Send + 'static,
{
    if nr_eval == 0 {
        return Ok(EvalStats::default());
    }
    if predictors.is_empty() {
        return Err(EvalError::NoPredictors.into());
    }

    let mut pool = WorkerPool::<E>::build(config);
    let channels = pool.run(predictors, env_config);
    let mut score_stat = StatCounter::new();
    let mut dist_stat = StatCounter::new();

    let pb = progress_bar(nr_eval, config.show_progress);
    let collected = collect(&channels, nr_eval, &mut score_stat, &mut dist_stat, &pb);
    pb.finish_and_clear();

    info!("Waiting for all the workers to finish the last run...");
    let stats = pool.stop_and_join();
    debug!("Stats of workers\n{}", worker_stats_fmt(&stats));
    collected?;

    score_stat.extend(channels.scores.try_iter());
    dist_stat.extend(channels.distances.try_iter());

    Ok(EvalStats::from_counters(&score_stat, &dist_stat))
}

/// Evaluates a model with `min(available_parallelism / 2, 8)` workers sharing `predictor`.
pub fn eval_model_multithread<E>(
    predictor: Arc<dyn Predictor<E::Obs>>,
    nr_eval: usize,
    env_config: &E::Config,
    config: &ParallelEvalConfig,
) -> Result<EvalStats>
where
    E: Env + 'static,
    E::Config: Send + 'static,
{
    let predictors = vec![predictor; n_workers(8)];
    let stats = eval_with_funcs::<E>(&predictors, nr_eval, env_config, config)?;
    info!(
        "Average Score: {}; Max Score: {}; Average Distance: {}; Max Distance: {}",
        stats.mean_score, stats.max_score, stats.mean_distance, stats.max_distance
    );
    Ok(stats)
}
