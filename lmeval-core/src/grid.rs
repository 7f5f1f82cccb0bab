//! A synthetic landmark search environment.
//!
//! The agent moves one voxel at a time along the axes of a 3-dimensional grid
//! until it reaches a target voxel. It stands in for a medical image simulator
//! in tests and in the command line demo.
use crate::{Env, LandmarkInfo, Predictor, Step};
use anyhow::Result;
use log::info;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
    time::Duration,
};

/// The number of actions, a step in the positive and negative direction of each axis.
pub const N_ACTIONS: usize = 6;

/// Configuration of [`GridEnv`].
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct GridEnvConfig {
    /// Size of the grid along each axis.
    pub dims: [i64; 3],

    /// Voxel spacing used to compute distances.
    pub spacing: [f32; 3],

    /// Names of the images. Episodes cycle through them.
    pub files: Vec<String>,

    /// Episodes are cut after this number of steps.
    pub max_steps: usize,

    /// Sleep in every step, emulating the cost of a simulator.
    pub step_delay_ms: u64,
}

impl Default for GridEnvConfig {
    fn default() -> Self {
        Self {
            dims: [16, 16, 16],
            spacing: [1.0, 1.0, 1.0],
            files: vec![],
            max_steps: 200,
            step_delay_ms: 0,
        }
    }
}

impl GridEnvConfig {
    /// Sets the size of the grid.
    pub fn dims(mut self, v: [i64; 3]) -> Self {
        self.dims = v;
        self
    }

    /// Sets the voxel spacing.
    pub fn spacing(mut self, v: [f32; 3]) -> Self {
        self.spacing = v;
        self
    }

    /// Sets the list of images.
    pub fn files(mut self, v: Vec<String>) -> Self {
        self.files = v;
        self
    }

    /// Sets the maximum number of steps in an episode.
    pub fn max_steps(mut self, v: usize) -> Self {
        self.max_steps = v;
        self
    }

    /// Sets the sleep in every step.
    pub fn step_delay_ms(mut self, v: u64) -> Self {
        self.step_delay_ms = v;
        self
    }

    /// Constructs [`GridEnvConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`GridEnvConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

/// Observation of [`GridEnv`].
#[derive(Clone, Debug, PartialEq)]
pub struct GridObs {
    /// Current location.
    pub loc: [i64; 3],

    /// Target location minus current location.
    pub offset: [i64; 3],
}

/// A 3-dimensional grid with a single target voxel per image.
pub struct GridEnv {
    config: GridEnvConfig,
    rng: fastrand::Rng,
    episode: usize,
    steps: usize,
    filename: String,
    loc: [i64; 3],
    target: [i64; 3],
    start: [i64; 3],
}

impl GridEnv {
    fn distance(&self, loc: &[i64; 3]) -> f32 {
        loc.iter()
            .zip(self.target.iter())
            .zip(self.config.spacing.iter())
            .map(|((a, b), s)| ((a - b) as f32 * s).powi(2))
            .sum::<f32>()
            .sqrt()
    }

    fn random_loc(rng: &fastrand::Rng, dims: &[i64; 3]) -> [i64; 3] {
        [rng.i64(0..dims[0]), rng.i64(0..dims[1]), rng.i64(0..dims[2])]
    }

    fn obs(&self) -> GridObs {
        GridObs {
            loc: self.loc,
            offset: [
                self.target[0] - self.loc[0],
                self.target[1] - self.loc[1],
                self.target[2] - self.loc[2],
            ],
        }
    }

    fn info(&self) -> LandmarkInfo {
        let f = |v: &[i64; 3]| [v[0] as f32, v[1] as f32, v[2] as f32];
        LandmarkInfo {
            filename: self.filename.clone(),
            dist_error: self.distance(&self.loc),
            loc: f(&self.loc),
            target_loc: f(&self.target),
            spacing: self.config.spacing,
            start_pos: f(&self.start),
        }
    }
}

impl Env for GridEnv {
    type Config = GridEnvConfig;
    type Obs = GridObs;

    fn build(config: &Self::Config, seed: i64) -> Result<Self> {
        anyhow::ensure!(
            config.dims.iter().all(|d| *d > 0),
            "grid dimensions must be positive: {:?}",
            config.dims
        );
        Ok(Self {
            config: config.clone(),
            rng: fastrand::Rng::with_seed(seed as u64),
            episode: 0,
            steps: 0,
            filename: String::new(),
            loc: [0; 3],
            target: [0; 3],
            start: [0; 3],
        })
    }

    fn reset(&mut self) -> Result<GridObs> {
        // The target depends only on the image, the start position on the env's rng.
        let (ix, filename) = match self.config.files.len() {
            0 => (0, "synthetic".to_string()),
            n => {
                let ix = self.episode % n;
                (ix, self.config.files[ix].clone())
            }
        };
        let target_rng = fastrand::Rng::with_seed(ix as u64 + 1);
        self.target = Self::random_loc(&target_rng, &self.config.dims);
        self.start = Self::random_loc(&self.rng, &self.config.dims);
        self.loc = self.start;
        self.filename = filename;
        self.steps = 0;
        self.episode += 1;
        Ok(self.obs())
    }

    fn step(&mut self, act: usize, _q_values: &[f32]) -> Result<Step<Self>> {
        anyhow::ensure!(act < N_ACTIONS, "invalid action {}", act);
        if self.config.step_delay_ms > 0 {
            std::thread::sleep(Duration::from_millis(self.config.step_delay_ms));
        }

        let axis = act / 2;
        let delta = if act % 2 == 0 { 1 } else { -1 };
        let dist_prev = self.distance(&self.loc);
        let mut loc = self.loc;
        loc[axis] = (loc[axis] + delta).clamp(0, self.config.dims[axis] - 1);
        self.loc = loc;
        self.steps += 1;

        let dist = self.distance(&self.loc);
        let is_done = dist == 0.0 || self.steps >= self.config.max_steps;
        Ok(Step::new(self.obs(), dist_prev - dist, is_done, self.info()))
    }

    /// Logs the agent's location relative to the target.
    fn render(&mut self) -> Result<()> {
        info!(
            "{} step {}: loc {:?}, target {:?}, distance {}",
            self.filename,
            self.steps,
            self.loc,
            self.target,
            self.distance(&self.loc)
        );
        Ok(())
    }
}

/// Predicts the action values of [`GridEnv`] from the exact offset to the target.
///
/// An action moving towards the target gets value 1, one moving away gets -1,
/// and a move along an axis already aligned with the target gets -1 as well.
#[derive(Clone, Debug, Default)]
pub struct OraclePredictor {}

impl Predictor<GridObs> for OraclePredictor {
    fn predict_batch(&self, obs: &[GridObs]) -> Result<Vec<Vec<f32>>> {
        Ok(obs
            .iter()
            .map(|o| {
                let mut q = vec![-1f32; N_ACTIONS];
                for (axis, d) in o.offset.iter().enumerate() {
                    if *d > 0 {
                        q[2 * axis] = 1.0;
                    } else if *d < 0 {
                        q[2 * axis + 1] = 1.0;
                    }
                }
                q
            })
            .collect())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_files_cycle_and_targets_are_fixed_per_file() -> Result<()> {
        let config = GridEnvConfig::default().files(vec!["a".to_string(), "b".to_string()]);
        let mut env = GridEnv::build(&config, 0)?;

        env.reset()?;
        let (file_a, target_a) = (env.filename.clone(), env.target);
        env.reset()?;
        assert_eq!(env.filename, "b");
        env.reset()?;
        assert_eq!(env.filename, file_a);
        assert_eq!(env.target, target_a);
        Ok(())
    }

    #[test]
    fn test_max_steps() -> Result<()> {
        let config = GridEnvConfig::default().max_steps(3);
        let mut env = GridEnv::build(&config, 1)?;
        env.reset()?;

        let mut n = 0;
        loop {
            n += 1;
            let q = vec![0.0; N_ACTIONS];
            if env.step(n % 2, &q)?.is_done {
                break;
            }
        }
        assert!(n <= 3);
        Ok(())
    }

    #[test]
    fn test_render_while_playing() -> Result<()> {
        let mut env = GridEnv::build(&GridEnvConfig::default(), 3)?;
        let result = crate::play_one_episode(&mut env, &OraclePredictor::default(), true)?;
        assert_eq!(result.dist_error, 0.0);
        env.render()?;
        Ok(())
    }

    #[test]
    fn test_invalid_action() -> Result<()> {
        let mut env = GridEnv::build(&GridEnvConfig::default(), 0)?;
        env.reset()?;
        assert!(env.step(N_ACTIONS, &[]).is_err());
        Ok(())
    }

    #[test]
    fn test_serde_config() -> Result<()> {
        let config = GridEnvConfig::default()
            .dims([8, 9, 10])
            .spacing([0.5, 0.5, 2.0])
            .files(vec!["case_01.nii.gz".to_string()]);
        let dir = TempDir::new("grid_env_config")?;
        let path = dir.path().join("grid_env_config.yaml");

        config.save(&path)?;
        assert_eq!(config, GridEnvConfig::load(&path)?);
        Ok(())
    }
}
