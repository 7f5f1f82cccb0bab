//! Configuration of parallel evaluation.
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
    time::Duration,
};

/// Configuration of [`eval_with_funcs`](crate::eval_with_funcs).
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct ParallelEvalConfig {
    /// Capacity of the score and distance channels. Unbounded if `None`.
    pub channel_capacity: Option<usize>,

    /// How long a worker waits on a full channel before checking the stop flag again.
    ///
    /// Values below 1 ms are treated as 1 ms.
    pub put_timeout_ms: u64,

    /// Pause after starting each worker.
    ///
    /// Some simulators misbehave when many instances start at the same time.
    pub start_interval_ms: u64,

    /// Shows a progress bar while collecting episodes.
    pub show_progress: bool,
}

impl Default for ParallelEvalConfig {
    fn default() -> Self {
        Self {
            channel_capacity: None,
            put_timeout_ms: 5000,
            start_interval_ms: 100,
            show_progress: true,
        }
    }
}

impl ParallelEvalConfig {
    /// Sets the capacity of the channels.
    pub fn channel_capacity(mut self, v: Option<usize>) -> Self {
        self.channel_capacity = v;
        self
    }

    /// Sets the timeout of a single put on a full channel in milliseconds.
    pub fn put_timeout_ms(mut self, v: u64) -> Self {
        self.put_timeout_ms = v;
        self
    }

    /// Sets the pause after starting each worker in milliseconds.
    pub fn start_interval_ms(mut self, v: u64) -> Self {
        self.start_interval_ms = v;
        self
    }

    /// Shows or hides the progress bar.
    pub fn show_progress(mut self, v: bool) -> Self {
        self.show_progress = v;
        self
    }

    /// At least 1 ms, so that a worker on a full channel never spins.
    pub(crate) fn put_timeout(&self) -> Duration {
        Duration::from_millis(self.put_timeout_ms.max(1))
    }

    pub(crate) fn start_interval(&self) -> Duration {
        Duration::from_millis(self.start_interval_ms)
    }

    /// Constructs [`ParallelEvalConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`ParallelEvalConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
