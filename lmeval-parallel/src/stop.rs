//! Cooperative cancellation of workers.
use anyhow::Result;
use crossbeam_channel::{SendTimeoutError, Sender};
use lmeval_core::{error::EvalError, Predictor};
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

/// A flag shared by a pool of workers. Once set, it stays set.
#[derive(Clone, Debug, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    /// Creates a flag that is not set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the flag.
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Returns `true` if the flag has been set.
    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Sends `item` unless `stop` is set.
///
/// On a full bounded channel the send is retried every `timeout` until it
/// succeeds or the flag is set. Returns [`EvalError::Stopped`] in the latter
/// case and when the receiver is gone, so a pending send never outlives a stop.
pub fn send_stoppable<T>(
    sender: &Sender<T>,
    mut item: T,
    stop: &StopFlag,
    timeout: Duration,
) -> Result<()> {
    loop {
        if stop.is_stopped() {
            return Err(EvalError::Stopped.into());
        }
        match sender.send_timeout(item, timeout) {
            Ok(()) => return Ok(()),
            Err(SendTimeoutError::Timeout(v)) => item = v,
            Err(SendTimeoutError::Disconnected(_)) => return Err(EvalError::Stopped.into()),
        }
    }
}

/// Wraps a predictor so that prediction fails with [`EvalError::Stopped`]
/// once the stop flag is set.
///
/// This ends an episode in progress at the next environment step.
pub struct StoppablePredictor<O> {
    inner: Arc<dyn Predictor<O>>,
    stop: StopFlag,
}

impl<O> StoppablePredictor<O> {
    /// Wraps `inner`.
    pub fn new(inner: Arc<dyn Predictor<O>>, stop: StopFlag) -> Self {
        Self { inner, stop }
    }
}

impl<O> Predictor<O> for StoppablePredictor<O> {
    fn predict_batch(&self, obs: &[O]) -> Result<Vec<Vec<f32>>> {
        if self.stop.is_stopped() {
            return Err(EvalError::Stopped.into());
        }
        self.inner.predict_batch(obs)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crossbeam_channel::bounded;
    use lmeval_core::grid::{GridObs, OraclePredictor};

    #[test]
    fn test_send_on_full_channel_aborts_after_stop() {
        let (s, r) = bounded(1);
        let stop = StopFlag::new();
        send_stoppable(&s, 1, &stop, Duration::from_millis(10)).unwrap();

        let stop_ = stop.clone();
        let handle = std::thread::spawn(move || {
            send_stoppable(&s, 2, &stop_, Duration::from_millis(10))
        });
        std::thread::sleep(Duration::from_millis(50));
        stop.stop();

        let err = handle.join().unwrap().unwrap_err();
        assert!(EvalError::is_stopped(&err));
        assert_eq!(r.try_iter().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_send_after_stop_is_dropped() {
        let (s, r) = crossbeam_channel::unbounded();
        let stop = StopFlag::new();
        stop.stop();
        assert!(send_stoppable(&s, 1, &stop, Duration::from_millis(10)).is_err());
        assert!(r.is_empty());
    }

    #[test]
    fn test_stoppable_predictor() {
        let stop = StopFlag::new();
        let predictor = StoppablePredictor::<GridObs>::new(
            Arc::new(OraclePredictor::default()),
            stop.clone(),
        );
        let obs = GridObs {
            loc: [0, 0, 0],
            offset: [1, 0, 0],
        };

        assert_eq!(predictor.predict(&obs).unwrap()[0], 1.0);
        stop.stop();
        assert!(EvalError::is_stopped(&predictor.predict(&obs).unwrap_err()));
    }
}
