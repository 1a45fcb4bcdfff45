//! FFT-based normalized cross-correlation matcher.
//!
//! One call matches a reference chip (earlier epoch) inside a larger search
//! chip (later epoch):
//! - cross products of every full-overlap shift via a radix-2 2D FFT,
//! - normalization to correlation coefficients with a ranked top-32 peak list,
//! - peak acceptance against the background statistics of the surface,
//! - sub-pixel refinement with a weighted quadratic fit and error estimates.
//!
//! Lattice iteration and record assembly live in `imcorr-tracking`.

mod chip;
pub mod correlate;
pub mod evaluate;
pub mod fft;
pub mod fit;
mod matcher;
pub mod normalize;
mod params;

pub use chip::{chip_origin, Chip};
pub use fit::SubpixelFit;
pub use matcher::{ChipMatch, ChipMatcher, Rejection};
pub use normalize::{CorrelationSurface, Peak, PeakList, MAX_PEAKS};
pub use params::{
    ChipSize, FitMethod, InvalidChipSize, MatchParams, DEFAULT_BACKGROUND_EXCLUSION,
    DEFAULT_EDGE_MARGIN, DEFAULT_MIN_STRENGTH, DEFAULT_SECONDARY_PEAK_BONUS,
    DEFAULT_VARIANCE_FLOOR, NOISE_REJECTING_MIN_STRENGTH,
};
