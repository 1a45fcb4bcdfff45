//! Feature tracking over a regular lattice of sample points.
//!
//! [`FeatureTracker`] walks the lattice where full chips fit, runs the
//! `imcorr-matcher` pipeline at every point and turns accepted matches into
//! [`DisplacementRecord`]s in world units. With paired elevation rasters the
//! records also carry the 3D displacement and slope.
//!
//! Enable the `rayon` feature to evaluate lattice points in parallel; record
//! order and identifiers do not depend on it.

mod io;
mod tracker;

pub use io::{TrackConfig, TrackIoError, TrackReport};
pub use tracker::{
    CancelToken, DisplacementRecord, Elevation3d, ElevationPair, FeatureTracker, LatticeSpec,
    NoopObserver, RejectionCounts, TrackError, TrackInputs, TrackObserver, TrackOutput,
    TrackParams, TrackSummary,
};

pub use imcorr_core::{GridGeometry, Raster, RasterView};
pub use imcorr_matcher::{ChipMatch, ChipSize, FitMethod, MatchParams, Rejection};
