use crate::{send_stoppable, StopFlag, StoppablePredictor, WorkerStat};
use anyhow::{anyhow, Result};
use crossbeam_channel::Sender;
use lmeval_core::{error::EvalError, play_one_episode, Env, Predictor};
use log::debug;
use std::{
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

/// Plays episodes with a predictor on its own environment until stopped.
///
/// The score and the distance error of every episode are pushed to the
/// channels given to [`Worker::run`].
pub struct Worker<E: Env> {
    id: usize,
    predictor: Arc<dyn Predictor<E::Obs>>,
    env_config: E::Config,
    stop: StopFlag,
    put_timeout: Duration,
}

impl<E: Env> Worker<E> {
    /// Builds a worker. `id` is also used as the seed of the environment.
    pub fn build(
        id: usize,
        predictor: Arc<dyn Predictor<E::Obs>>,
        env_config: E::Config,
        stop: StopFlag,
        put_timeout: Duration,
    ) -> Self {
        Self {
            id,
            predictor,
            env_config,
            stop,
            put_timeout,
        }
    }

    /// Runs the episode loop until the stop flag is set.
    ///
    /// The environment is built while holding `guard_init_env`. Observing the
    /// stop flag, either before an episode, inside a prediction or while pushing
    /// a result, ends the loop with `Ok`. Any other error ends it with `Err`.
    pub fn run(
        self,
        score_sender: &Sender<f32>,
        dist_sender: &Sender<f32>,
        guard_init_env: Arc<Mutex<()>>,
    ) -> Result<WorkerStat> {
        let time = Instant::now();
        let mut env = {
            let _guard = guard_init_env
                .lock()
                .map_err(|_| anyhow!("lock for environment initialization is poisoned"))?;
            E::build(&self.env_config, self.id as i64)?
        };
        let predictor = StoppablePredictor::new(self.predictor.clone(), self.stop.clone());
        let mut episodes = 0;

        while !self.stop.is_stopped() {
            let pushed = play_one_episode(&mut env, &predictor, false).and_then(|result| {
                send_stoppable(score_sender, result.score, &self.stop, self.put_timeout)?;
                send_stoppable(dist_sender, result.dist_error, &self.stop, self.put_timeout)
            });

            match pushed {
                Ok(()) => episodes += 1,
                Err(e) if EvalError::is_stopped(&e) => break,
                Err(e) => return Err(e),
            }
        }
        debug!("Worker {} stopped after {} episodes", self.id, episodes);

        Ok(WorkerStat {
            episodes,
            duration: time.elapsed(),
        })
    }
}
