use crate::ParallelEvalConfig;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
    time::Duration,
};

/// Configuration of [`Evaluator`](crate::Evaluator).
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct EvaluatorConfig {
    /// The number of episodes of the first evaluation.
    pub nr_eval: usize,

    /// Names of the model inputs the predictor is built with.
    pub input_names: Vec<String>,

    /// Names of the model outputs the predictor is built with.
    pub output_names: Vec<String>,

    /// Upper bound of the number of workers.
    pub max_workers: usize,

    /// If an evaluation takes longer than this, the next one runs fewer episodes.
    pub time_limit_secs: u64,

    /// Factor applied to the number of episodes after a slow evaluation.
    pub decay: f64,

    /// Configuration of the workers.
    pub parallel: ParallelEvalConfig,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            nr_eval: 50,
            input_names: vec!["state".to_string()],
            output_names: vec!["Qvalue".to_string()],
            max_workers: 20,
            time_limit_secs: 600,
            decay: 0.94,
            parallel: ParallelEvalConfig::default(),
        }
    }
}

impl EvaluatorConfig {
    /// Sets the number of episodes of the first evaluation.
    pub fn nr_eval(mut self, v: usize) -> Self {
        self.nr_eval = v;
        self
    }

    /// Sets the names of inputs and outputs of the predictor.
    pub fn names(mut self, input_names: Vec<String>, output_names: Vec<String>) -> Self {
        self.input_names = input_names;
        self.output_names = output_names;
        self
    }

    /// Sets the upper bound of the number of workers.
    pub fn max_workers(mut self, v: usize) -> Self {
        self.max_workers = v;
        self
    }

    /// Sets the time limit of an evaluation in seconds.
    pub fn time_limit_secs(mut self, v: u64) -> Self {
        self.time_limit_secs = v;
        self
    }

    /// Sets the decay of the number of episodes.
    pub fn decay(mut self, v: f64) -> Self {
        self.decay = v;
        self
    }

    /// Sets the configuration of the workers.
    pub fn parallel(mut self, v: ParallelEvalConfig) -> Self {
        self.parallel = v;
        self
    }

    pub(crate) fn time_limit(&self) -> Duration {
        Duration::from_secs(self.time_limit_secs)
    }

    /// Constructs [`EvaluatorConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`EvaluatorConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_serde_evaluator_config() -> Result<()> {
        let config = EvaluatorConfig::default()
            .nr_eval(200)
            .max_workers(4)
            .parallel(ParallelEvalConfig::default().channel_capacity(Some(16)));

        let dir = TempDir::new("evaluator_config")?;
        let path = dir.path().join("evaluator_config.yaml");
        config.save(&path)?;
        let config_ = EvaluatorConfig::load(&path)?;
        assert_eq!(config, config_);
        Ok(())
    }
}
