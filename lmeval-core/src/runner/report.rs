//! Tabular report of played episodes.
use super::EpisodeResult;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{fs::File, io::Write, path::Path};

/// Column names of the episode report, in order.
pub const EPISODE_ROW_HEADER: [&str; 13] = [
    "idx_num",
    "filename",
    "score",
    "distance_error",
    "final_coordinates_x",
    "final_coordinates_y",
    "final_coordinates_z",
    "target_x",
    "target_y",
    "target_z",
    "spacing_x",
    "spacing_y",
    "spacing_z",
];

/// A row of the episode report.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EpisodeRow {
    /// 1-based index of the episode.
    pub idx_num: usize,
    /// Image file.
    pub filename: String,
    /// Sum of rewards.
    pub score: f32,
    /// Final distance to the target.
    pub distance_error: f32,
    /// Final location, x.
    pub final_coordinates_x: f32,
    /// Final location, y.
    pub final_coordinates_y: f32,
    /// Final location, z.
    pub final_coordinates_z: f32,
    /// Target location, x.
    pub target_x: f32,
    /// Target location, y.
    pub target_y: f32,
    /// Target location, z.
    pub target_z: f32,
    /// Voxel spacing, x.
    pub spacing_x: f32,
    /// Voxel spacing, y.
    pub spacing_y: f32,
    /// Voxel spacing, z.
    pub spacing_z: f32,
}

impl EpisodeRow {
    /// Builds the row of the `idx_num`-th episode.
    pub fn new(idx_num: usize, result: &EpisodeResult) -> Self {
        Self {
            idx_num,
            filename: result.filename.clone(),
            score: result.score,
            distance_error: result.dist_error,
            final_coordinates_x: result.loc[0],
            final_coordinates_y: result.loc[1],
            final_coordinates_z: result.loc[2],
            target_x: result.target_loc[0],
            target_y: result.target_loc[1],
            target_z: result.target_loc[2],
            spacing_x: result.spacing[0],
            spacing_y: result.spacing[1],
            spacing_z: result.spacing[2],
        }
    }
}

/// Writes rows as CSV, preceded by [`EPISODE_ROW_HEADER`].
pub fn write_episode_rows<W: Write>(rows: &[EpisodeRow], writer: W) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    wtr.write_record(EPISODE_ROW_HEADER)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes rows as a CSV file at `path`.
pub fn save_episode_rows(rows: &[EpisodeRow], path: impl AsRef<Path>) -> Result<()> {
    write_episode_rows(rows, File::create(path)?)
}
