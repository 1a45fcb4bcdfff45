//! High-level facade crate for the `imcorr-*` workspace.
//!
//! This crate provides:
//! - stable, convenient re-exports of the underlying crates
//! - (feature-gated) helpers that load epoch rasters from image files and run
//!   a full tracking job described by a JSON [`TrackConfig`].
//!
//! ## Quickstart
//!
//! ```no_run
//! use imcorr::{FeatureTracker, GridGeometry, Raster, TrackInputs, TrackParams};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let earlier = Raster::from_fn(256, 256, |x, y| ((x * 7 + y * 3) % 31) as f64)?;
//! let later = Raster::from_fn(256, 256, |x, y| ((x * 7 + y * 3 + 5) % 31) as f64)?;
//!
//! let tracker = FeatureTracker::new(TrackParams::default())?;
//! let inputs = TrackInputs::new(earlier.view(), later.view(), GridGeometry::default());
//! let out = tracker.track(&inputs)?;
//! println!("accepted {} of {}", out.summary.accepted, out.summary.lattice_points);
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `imcorr::core`: rasters, grid geometry, bilinear sampling, logging.
//! - `imcorr::matcher`: the per-point correlation and sub-pixel fitting engine.
//! - `imcorr::tracking`: lattice driver, displacement records, JSON I/O.
//! - `imcorr::load` (feature `image`): rasters from image files.
//! - `imcorr::run` (feature `image`): end-to-end run of a [`TrackConfig`].

pub use imcorr_core as core;
pub use imcorr_matcher as matcher;
pub use imcorr_tracking as tracking;

pub use imcorr_core::{GridGeometry, Raster, RasterError, RasterView};
pub use imcorr_matcher::{ChipMatch, ChipMatcher, ChipSize, FitMethod, MatchParams, Rejection};
pub use imcorr_tracking::{
    CancelToken, DisplacementRecord, FeatureTracker, TrackConfig, TrackError, TrackInputs,
    TrackObserver, TrackOutput, TrackParams, TrackReport, TrackSummary,
};

#[cfg(feature = "image")]
pub mod load;
#[cfg(feature = "image")]
pub mod run;
