//! Environment step.
use super::Env;

/// Information attached to every [`Step`].
///
/// Only the values of the last step of an episode are used for reporting.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LandmarkInfo {
    /// Name of the image file the episode runs on.
    pub filename: String,

    /// Distance between the current and the target location.
    pub dist_error: f32,

    /// Current location.
    pub loc: [f32; 3],

    /// Target location.
    pub target_loc: [f32; 3],

    /// Voxel spacing of the image.
    pub spacing: [f32; 3],

    /// Location at the beginning of the episode.
    pub start_pos: [f32; 3],
}

/// Represents an observation and reward pair `(o_t+1, r_t)`, emitted by
/// [`Env::step`].
pub struct Step<E: Env> {
    /// Observation.
    pub obs: E::Obs,

    /// Reward.
    pub reward: f32,

    /// Flag denoting the end of the episode.
    pub is_done: bool,

    /// Information of the step.
    pub info: LandmarkInfo,
}

impl<E: Env> Step<E> {
    /// Constructs a [`Step`] object.
    pub fn new(obs: E::Obs, reward: f32, is_done: bool, info: LandmarkInfo) -> Self {
        Step {
            obs,
            reward,
            is_done,
            info,
        }
    }
}
