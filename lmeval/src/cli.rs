//! Command line interface of the `lmeval` binary.
//!
//! Runs the synthetic grid environment with the oracle predictor, which is
//! handy to check an installation and to see the shape of the reports.
use crate::{
    eval_model_multithread,
    grid::{GridEnv, GridEnvConfig, GridObs, OraclePredictor},
    play_n_episodes,
    record::{NullRecorder, Recorder},
    save_episode_rows, Callback, Env, Evaluator, EvaluatorConfig, Predictor,
    RecorderContext, TensorboardRecorder,
};
use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use log::info;
use std::{path::PathBuf, sync::Arc};

/// Evaluates a policy on a landmark search environment.
#[derive(Parser, Debug)]
#[command(name = "lmeval", version, about)]
pub struct Cli {
    /// YAML file with the configuration of the environment.
    #[arg(long, global = true)]
    pub env_config: Option<PathBuf>,

    /// Image files to run episodes on, overriding the configuration.
    #[arg(long, global = true, value_delimiter = ',')]
    pub files: Vec<String>,

    /// What to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Plays episodes one at a time and prints a line per episode.
    Play(PlayArgs),

    /// Runs episodes on worker threads and reports aggregated statistics.
    Eval(EvalArgs),
}

/// Arguments of `play`.
#[derive(Args, Debug)]
pub struct PlayArgs {
    /// The number of episodes.
    #[arg(short = 'n', long, default_value_t = 5)]
    pub episodes: usize,

    /// Logs the location of the agent at every step.
    #[arg(long)]
    pub render: bool,

    /// Writes the episode table to this CSV file.
    #[arg(long)]
    pub csv: Option<PathBuf>,
}

/// Arguments of `eval`.
#[derive(Args, Debug)]
pub struct EvalArgs {
    /// The number of episodes.
    #[arg(short = 'n', long, default_value_t = 50)]
    pub episodes: usize,

    /// Runs the periodic evaluator this many times instead of a single evaluation.
    #[arg(long, default_value_t = 0)]
    pub triggers: usize,

    /// YAML file with the configuration of the evaluator.
    #[arg(long)]
    pub evaluator_config: Option<PathBuf>,

    /// Directory for TensorBoard event files written by the periodic evaluator.
    #[arg(long)]
    pub logdir: Option<PathBuf>,

    /// Hides the progress bar.
    #[arg(long)]
    pub quiet: bool,
}

fn env_config(cli: &Cli) -> Result<GridEnvConfig> {
    let config = match &cli.env_config {
        Some(path) => GridEnvConfig::load(path)?,
        None => GridEnvConfig::default(),
    };
    if cli.files.is_empty() {
        Ok(config)
    } else {
        Ok(config.files(cli.files.clone()))
    }
}

fn play(args: &PlayArgs, env_config: &GridEnvConfig) -> Result<()> {
    let mut env = GridEnv::build(env_config, 0)?;
    let rows = play_n_episodes(&mut env, &OraclePredictor::default(), args.episodes, args.render)?;
    if let Some(path) = &args.csv {
        save_episode_rows(&rows, path)?;
        info!("Saved {} episodes in {:?}", rows.len(), path);
    }
    Ok(())
}

fn run_evaluator<R: Recorder>(
    config: EvaluatorConfig,
    env_config: GridEnvConfig,
    recorder: R,
    triggers: usize,
) -> Result<R> {
    let predictor: Arc<dyn Predictor<GridObs>> = Arc::new(OraclePredictor::default());
    let mut ctx = RecorderContext::<GridEnv, R>::new(predictor, recorder);
    let mut evaluator = Evaluator::<GridEnv>::new(config, env_config);

    evaluator.setup(&mut ctx)?;
    for i in 0..triggers {
        ctx.set_global_step(i + 1);
        evaluator.trigger(&mut ctx)?;
    }
    Ok(ctx.into_recorder())
}

fn eval(args: &EvalArgs, env_config: GridEnvConfig) -> Result<()> {
    let config = match &args.evaluator_config {
        Some(path) => EvaluatorConfig::load(path)?,
        None => EvaluatorConfig::default().nr_eval(args.episodes),
    };
    let config = if args.quiet {
        let parallel = config.parallel.clone().show_progress(false);
        config.parallel(parallel)
    } else {
        config
    };

    if args.triggers == 0 {
        let predictor: Arc<dyn Predictor<GridObs>> = Arc::new(OraclePredictor::default());
        eval_model_multithread::<GridEnv>(predictor, config.nr_eval, &env_config, &config.parallel)?;
        return Ok(());
    }

    match &args.logdir {
        Some(logdir) => {
            let recorder = TensorboardRecorder::new(logdir);
            let mut recorder = run_evaluator(config, env_config, recorder, args.triggers)?;
            recorder.flush();
        }
        None => {
            run_evaluator(config, env_config, NullRecorder::default(), args.triggers)?;
        }
    }
    Ok(())
}

/// Runs the command given on the command line.
pub fn run(cli: Cli) -> Result<()> {
    let env_config = env_config(&cli)?;
    match &cli.command {
        Command::Play(args) => play(args, &env_config),
        Command::Eval(args) => eval(args, env_config),
    }
}
