//! Single-threaded episode rollouts.
mod report;
use crate::{Env, Predictor};
use anyhow::Result;
use log::info;
pub use report::{save_episode_rows, write_episode_rows, EpisodeRow, EPISODE_ROW_HEADER};

/// Outcome of a single episode.
#[derive(Clone, Debug, PartialEq)]
pub struct EpisodeResult {
    /// Sum of rewards over the episode.
    pub score: f32,

    /// Image file the episode ran on.
    pub filename: String,

    /// Distance between the final and the target location.
    pub dist_error: f32,

    /// Final location.
    pub loc: [f32; 3],

    /// Target location.
    pub target_loc: [f32; 3],

    /// Voxel spacing of the image.
    pub spacing: [f32; 3],

    /// Location at the beginning of the episode.
    pub start_pos: [f32; 3],
}

/// Returns the index of the largest action value.
///
/// The first index wins on ties, and the first NaN wins over any number.
/// An empty slice gives `0`.
pub fn greedy_action(q_values: &[f32]) -> usize {
    let mut best = 0;
    for (i, q) in q_values.iter().enumerate().skip(1) {
        if q_values[best].is_nan() {
            break;
        }
        if q.is_nan() || *q > q_values[best] {
            best = i;
        }
    }
    best
}

/// Runs a full episode, always taking the action with the best predicted value.
///
/// There is no exploration. Errors of the predictor or the environment are
/// returned as they are.
pub fn play_one_episode<E, P>(env: &mut E, predictor: &P, render: bool) -> Result<EpisodeResult>
where
    E: Env,
    P: Predictor<E::Obs> + ?Sized,
{
    let mut obs = env.reset()?;
    let mut score = 0f32;

    loop {
        let q_values = predictor.predict(&obs)?;
        let act = greedy_action(&q_values);
        let step = env.step(act, &q_values)?;
        if render {
            env.render()?;
        }
        score += step.reward;

        if step.is_done {
            let info = step.info;
            return Ok(EpisodeResult {
                score,
                filename: info.filename,
                dist_error: info.dist_error,
                loc: info.loc,
                target_loc: info.target_loc,
                spacing: info.spacing,
                start_pos: info.start_pos,
            });
        }
        obs = step.obs;
    }
}

/// Plays `nr` episodes one at a time and logs each of them.
///
/// Returns one [`EpisodeRow`] per episode, numbered from 1.
pub fn play_n_episodes<E, P>(
    env: &mut E,
    predictor: &P,
    nr: usize,
    render: bool,
) -> Result<Vec<EpisodeRow>>
where
    E: Env,
    P: Predictor<E::Obs> + ?Sized,
{
    info!("Start Playing ... ");
    let mut rows = Vec::with_capacity(nr);

    for k in 0..nr {
        let result = play_one_episode(env, predictor, render)?;
        info!(
            " Starting Position:{:?}\n{:04}/{:04} - {:>15} - score {:>5.2} - distError {:>5.2} - final_loc {:?} - target_loc {:?} - spacing {:?}",
            result.start_pos,
            k + 1,
            nr,
            result.filename,
            result.score,
            result.dist_error,
            result.loc,
            result.target_loc,
            result.spacing,
        );
        rows.push(EpisodeRow::new(k + 1, &result));
    }

    Ok(rows)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::grid::{GridEnv, GridEnvConfig, OraclePredictor};

    #[test]
    fn test_greedy_action() {
        assert_eq!(greedy_action(&[0.1, 0.5, -1.0]), 1);
        assert_eq!(greedy_action(&[2.0, 2.0, 1.0]), 0);
        assert_eq!(greedy_action(&[-3.0, -2.0]), 1);
        assert_eq!(greedy_action(&[]), 0);
    }

    #[test]
    fn test_greedy_action_with_nan() {
        assert_eq!(greedy_action(&[1.0, f32::NAN, 5.0]), 1);
        assert_eq!(greedy_action(&[f32::NAN, 5.0]), 0);
        assert_eq!(greedy_action(&[1.0, 5.0, f32::NAN, f32::NAN]), 2);
    }

    #[test]
    fn test_oracle_reaches_target() -> Result<()> {
        let config = GridEnvConfig::default();
        let mut env = GridEnv::build(&config, 7)?;
        let predictor = OraclePredictor::default();

        let result = play_one_episode(&mut env, &predictor, false)?;
        assert_eq!(result.dist_error, 0.0);
        assert_eq!(result.loc, result.target_loc);
        assert!(result.score >= 0.0);
        Ok(())
    }
}
