use imcorr_matcher::MatchParams;
use serde::{Deserialize, Serialize};

pub const DEFAULT_GRID_SPACING: f64 = 10.0;

/// Parameters of a tracking run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackParams {
    pub matching: MatchParams,
    /// Distance between lattice points in world units.
    pub grid_spacing: f64,
}

impl Default for TrackParams {
    fn default() -> Self {
        Self {
            matching: MatchParams::default(),
            grid_spacing: DEFAULT_GRID_SPACING,
        }
    }
}
