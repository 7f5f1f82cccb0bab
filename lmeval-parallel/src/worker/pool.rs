use crate::{ParallelEvalConfig, StopFlag, Worker, WorkerStat};
use anyhow::Error;
use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use lmeval_core::{Env, Predictor};
use log::{error, info};
use std::{
    marker::PhantomData,
    sync::{Arc, Mutex},
    thread::JoinHandle,
};

/// Receiving ends of the channels shared by the workers of a [`WorkerPool`].
///
/// The pool keeps no sender, so each channel disconnects once every worker
/// has exited.
pub struct WorkerChannels {
    /// Episode scores.
    pub scores: Receiver<f32>,

    /// Episode distance errors.
    pub distances: Receiver<f32>,

    /// Errors of workers that failed, tagged with the worker id.
    pub errors: Receiver<(usize, Error)>,
}

/// Manages [`Worker`]s.
///
/// Lifecycle of every worker: created in [`WorkerPool::run`], running until
/// [`WorkerPool::stop`], joined in [`WorkerPool::join`].
pub struct WorkerPool<E: Env> {
    config: ParallelEvalConfig,

    /// Flag to stop the workers.
    stop: StopFlag,

    /// Thread handles.
    threads: Vec<JoinHandle<Option<WorkerStat>>>,

    phantom: PhantomData<E>,
}

impl<E> WorkerPool<E>
where
    E: Env + 'static,
    E::Config: Send + 'static,
{
    /// Builds a [`WorkerPool`] without starting any thread.
    pub fn build(config: &ParallelEvalConfig) -> Self {
        Self {
            config: config.clone(),
            stop: StopFlag::new(),
            threads: vec![],
            phantom: PhantomData,
        }
    }

    fn channel<T>(&self) -> (Sender<T>, Receiver<T>) {
        match self.config.channel_capacity {
            Some(n) => bounded(n),
            None => unbounded(),
        }
    }

    /// Starts one worker thread per predictor.
    ///
    /// Environments are built one at a time, and the calling thread pauses for
    /// `start_interval_ms` after each start.
    pub fn run(
        &mut self,
        predictors: &[Arc<dyn Predictor<E::Obs>>],
        env_config: &E::Config,
    ) -> WorkerChannels {
        let (score_s, score_r) = self.channel();
        let (dist_s, dist_r) = self.channel();
        let (err_s, err_r) = unbounded();
        let guard_init_env = Arc::new(Mutex::new(()));

        for (id, predictor) in predictors.iter().enumerate() {
            let worker = Worker::<E>::build(
                id,
                predictor.clone(),
                env_config.clone(),
                self.stop.clone(),
                self.config.put_timeout(),
            );
            let score_s = score_s.clone();
            let dist_s = dist_s.clone();
            let err_s: Sender<(usize, Error)> = err_s.clone();
            let guard = guard_init_env.clone();

            // The error is sent before the result senders are dropped, so the
            // receiving side sees it no later than the disconnection.
            let handle = std::thread::spawn(move || match worker.run(&score_s, &dist_s, guard) {
                Ok(stat) => Some(stat),
                Err(e) => {
                    error!("Worker {} failed: {:#}", id, e);
                    let _ = err_s.send((id, e));
                    drop((score_s, dist_s));
                    None
                }
            });
            self.threads.push(handle);
            std::thread::sleep(self.config.start_interval());
        }
        info!("Started {} workers", self.threads.len());

        WorkerChannels {
            scores: score_r,
            distances: dist_r,
            errors: err_r,
        }
    }

    /// Stops worker threads.
    pub fn stop(&self) {
        self.stop.stop();
    }

    /// Waits until all workers finish.
    ///
    /// Returns the stats of the workers that exited normally. Failed or
    /// panicked workers are logged and left out.
    pub fn join(self) -> Vec<WorkerStat> {
        self.threads
            .into_iter()
            .enumerate()
            .filter_map(|(id, h)| match h.join() {
                Ok(stat) => stat,
                Err(_) => {
                    error!("Worker {} panicked", id);
                    None
                }
            })
            .collect()
    }

    /// Stops and joins workers.
    pub fn stop_and_join(self) -> Vec<WorkerStat> {
        self.stop();
        self.join()
    }
}
