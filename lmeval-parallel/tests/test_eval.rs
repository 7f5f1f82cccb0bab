use anyhow::Result;
use lmeval_core::{
    error::EvalError,
    grid::{GridEnv, GridEnvConfig, GridObs, OraclePredictor},
    record::BufferedRecorder,
    Predictor,
};
use lmeval_parallel::{
    eval_model_multithread, eval_with_funcs, Callback, Evaluator, EvaluatorConfig,
    ParallelEvalConfig, RecorderContext,
};
use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};
use test_log::test;

fn config() -> ParallelEvalConfig {
    ParallelEvalConfig::default()
        .start_interval_ms(0)
        .put_timeout_ms(10)
        .show_progress(false)
}

fn oracles(n: usize) -> Vec<Arc<dyn Predictor<GridObs>>> {
    let predictor: Arc<dyn Predictor<GridObs>> = Arc::new(OraclePredictor::default());
    vec![predictor; n]
}

/// Runs `f` on a thread and fails if it does not return within `timeout`.
fn with_timeout<T: Send + 'static>(
    timeout: Duration,
    f: impl FnOnce() -> T + Send + 'static,
) -> T {
    let (s, r) = crossbeam_channel::bounded(1);
    std::thread::spawn(move || {
        let _ = s.send(f());
    });
    r.recv_timeout(timeout).expect("evaluation did not finish in time")
}

#[test]
fn test_zero_episodes() -> Result<()> {
    let stats = with_timeout(Duration::from_secs(5), || {
        eval_with_funcs::<GridEnv>(&oracles(4), 0, &GridEnvConfig::default(), &config())
    })?;
    assert_eq!(stats.as_tuple(), (0.0, 0.0, 0.0, 0.0));
    assert_eq!(stats.n_scores, 0);
    Ok(())
}

#[test]
fn test_no_predictors() {
    let err = eval_with_funcs::<GridEnv>(&[], 3, &GridEnvConfig::default(), &config())
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<EvalError>(),
        Some(EvalError::NoPredictors)
    ));
}

#[test]
fn test_oracle_reaches_every_target() -> Result<()> {
    let n_workers = 3;
    let env_config = GridEnvConfig::default().files(vec![
        "case_01.nii.gz".to_string(),
        "case_02.nii.gz".to_string(),
    ]);
    let stats = eval_with_funcs::<GridEnv>(&oracles(n_workers), 20, &env_config, &config())?;

    assert!(stats.n_scores >= 20);
    assert!(stats.n_distances >= 20);
    assert!(stats.n_scores.abs_diff(stats.n_distances) <= n_workers);
    assert_eq!(stats.mean_distance, 0.0);
    assert_eq!(stats.max_distance, 0.0);
    assert!(stats.max_score >= stats.mean_score);
    Ok(())
}

#[test]
fn test_stop_with_full_bounded_channels() -> Result<()> {
    // Workers outnumber the channel slots, so most of them are blocked in a
    // put when the stop flag is set.
    let config = config().channel_capacity(Some(1));
    let env_config = GridEnvConfig::default().dims([2, 2, 2]);
    let stats = with_timeout(Duration::from_secs(30), move || {
        eval_with_funcs::<GridEnv>(&oracles(8), 5, &env_config, &config)
    })?;

    assert!(stats.n_scores >= 5);
    assert!(stats.n_scores.abs_diff(stats.n_distances) <= 8);
    Ok(())
}

/// Fails on the `n`-th prediction.
struct FailingPredictor {
    calls: AtomicUsize,
    n: usize,
}

impl Predictor<GridObs> for FailingPredictor {
    fn predict_batch(&self, obs: &[GridObs]) -> Result<Vec<Vec<f32>>> {
        if self.calls.fetch_add(1, Ordering::SeqCst) + 1 >= self.n {
            anyhow::bail!("device lost");
        }
        OraclePredictor::default().predict_batch(obs)
    }
}

#[test]
fn test_worker_failure_is_reported() {
    let predictor: Arc<dyn Predictor<GridObs>> = Arc::new(FailingPredictor {
        calls: AtomicUsize::new(0),
        n: 30,
    });
    let predictors = vec![predictor; 2];

    let result = with_timeout(Duration::from_secs(30), move || {
        eval_with_funcs::<GridEnv>(&predictors, 1000, &GridEnvConfig::default(), &config())
    });
    let err = result.unwrap_err();
    match err.downcast_ref::<EvalError>() {
        Some(EvalError::WorkerFailed { message, .. }) => assert!(message.contains("device lost")),
        other => panic!("unexpected error: {:?}", other),
    }
}

/// Panics on every prediction, so workers exit without reporting an error.
struct PanickingPredictor {}

impl Predictor<GridObs> for PanickingPredictor {
    fn predict_batch(&self, _obs: &[GridObs]) -> Result<Vec<Vec<f32>>> {
        panic!("predictor crashed");
    }
}

#[test]
fn test_panicking_workers_disconnect() {
    let predictor: Arc<dyn Predictor<GridObs>> = Arc::new(PanickingPredictor {});
    let predictors = vec![predictor; 2];

    let err = with_timeout(Duration::from_secs(30), move || {
        eval_with_funcs::<GridEnv>(&predictors, 10, &GridEnvConfig::default(), &config())
    })
    .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<EvalError>(),
        Some(EvalError::WorkersDisconnected(0))
    ));
}

#[test]
fn test_env_build_failure_is_reported() {
    let env_config = GridEnvConfig::default().dims([0, 4, 4]);
    let err = with_timeout(Duration::from_secs(30), move || {
        eval_with_funcs::<GridEnv>(&oracles(2), 10, &env_config, &config())
    })
    .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<EvalError>(),
        Some(EvalError::WorkerFailed { .. })
    ));
}

#[test]
fn test_eval_model_multithread() -> Result<()> {
    let predictor: Arc<dyn Predictor<GridObs>> = Arc::new(OraclePredictor::default());
    let stats =
        eval_model_multithread::<GridEnv>(predictor, 10, &GridEnvConfig::default(), &config())?;
    assert!(stats.n_scores >= 10);
    assert_eq!(stats.max_distance, 0.0);
    Ok(())
}

fn evaluator_config(nr_eval: usize) -> EvaluatorConfig {
    EvaluatorConfig::default()
        .nr_eval(nr_eval)
        .max_workers(2)
        .parallel(config())
}

#[test]
fn test_trigger_before_setup() {
    let mut evaluator = Evaluator::<GridEnv>::new(evaluator_config(5), GridEnvConfig::default());
    let mut ctx = RecorderContext::<GridEnv, _>::new(
        Arc::new(OraclePredictor::default()),
        BufferedRecorder::new(),
    );
    let err = evaluator.trigger(&mut ctx).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<EvalError>(),
        Some(EvalError::NotSetUp)
    ));
}

#[test]
fn test_evaluator_records_scalars() -> Result<()> {
    let mut evaluator = Evaluator::<GridEnv>::new(evaluator_config(6), GridEnvConfig::default());
    let mut ctx = RecorderContext::<GridEnv, _>::new(
        Arc::new(OraclePredictor::default()),
        BufferedRecorder::new(),
    );

    evaluator.setup(&mut ctx)?;
    assert!(evaluator.n_workers() >= 1 && evaluator.n_workers() <= 2);

    ctx.set_global_step(100);
    evaluator.trigger(&mut ctx)?;
    ctx.set_global_step(200);
    evaluator.trigger(&mut ctx)?;

    // Fast evaluations keep the budget.
    assert_eq!(evaluator.eval_episodes(), 6);

    let recorder = ctx.into_recorder();
    assert_eq!(recorder.len(), 8);
    assert_eq!(recorder.scalars("max_distance"), vec![0.0, 0.0]);
    assert_eq!(recorder.scalars("mean_score").len(), 2);
    assert_eq!(
        recorder.steps(),
        vec![100, 100, 100, 100, 200, 200, 200, 200]
    );
    Ok(())
}

#[test]
fn test_slow_evaluation_shrinks_budget() -> Result<()> {
    let config = evaluator_config(10).time_limit_secs(0);
    let env_config = GridEnvConfig::default().step_delay_ms(1);
    let mut evaluator = Evaluator::<GridEnv>::new(config, env_config);
    let mut ctx = RecorderContext::<GridEnv, _>::new(
        Arc::new(OraclePredictor::default()),
        BufferedRecorder::new(),
    );

    evaluator.setup(&mut ctx)?;
    evaluator.trigger(&mut ctx)?;
    assert_eq!(evaluator.eval_episodes(), 9);
    evaluator.trigger(&mut ctx)?;
    assert_eq!(evaluator.eval_episodes(), 8);
    assert!(evaluator.last_stats().is_some());
    Ok(())
}
