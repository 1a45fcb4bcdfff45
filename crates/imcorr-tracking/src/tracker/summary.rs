use imcorr_matcher::Rejection;
use serde::{Deserialize, Serialize};

/// Number of lattice points skipped per rejection reason.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectionCounts {
    pub no_data: usize,
    pub edge: usize,
    pub ambiguous: usize,
    pub weak: usize,
    pub singular_fit: usize,
    pub excess_displacement: usize,
    pub chip_size_mismatch: usize,
}

impl RejectionCounts {
    pub fn record(&mut self, rejection: &Rejection) {
        let slot = match rejection {
            Rejection::NoData => &mut self.no_data,
            Rejection::Edge => &mut self.edge,
            Rejection::Ambiguous => &mut self.ambiguous,
            Rejection::Weak { .. } => &mut self.weak,
            Rejection::SingularFit => &mut self.singular_fit,
            Rejection::ExcessDisplacement { .. } => &mut self.excess_displacement,
            Rejection::ChipSizeMismatch { .. } => &mut self.chip_size_mismatch,
        };
        *slot += 1;
    }

    pub fn total(&self) -> usize {
        self.no_data
            + self.edge
            + self.ambiguous
            + self.weak
            + self.singular_fit
            + self.excess_displacement
            + self.chip_size_mismatch
    }
}

/// Outcome counts of a tracking run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackSummary {
    /// Lattice points in the run.
    pub lattice_points: usize,
    /// Points processed before the run finished or stopped.
    pub visited: usize,
    pub accepted: usize,
    pub rejected: RejectionCounts,
    /// The observer asked to stop before every point was visited.
    pub cancelled: bool,
}
