//! Core traits.
mod env;
mod predictor;
mod step;
pub use env::Env;
pub use predictor::Predictor;
pub use step::{LandmarkInfo, Step};
