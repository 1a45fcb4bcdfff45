use imcorr_core::RasterError;

/// Errors that prevent a tracking run from starting.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum TrackError {
    #[error("epoch rasters differ in size ({earlier:?} vs {later:?})")]
    GeometryMismatch {
        earlier: (usize, usize),
        later: (usize, usize),
    },
    #[error("elevation raster {found:?} does not match image size {expected:?}")]
    ElevationMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },
    #[error("grid spacing must be positive and finite (got {0})")]
    InvalidGridSpacing(f64),
    #[error("raster {width}x{height} is smaller than the {chip}x{chip} search chip")]
    RasterTooSmall {
        width: usize,
        height: usize,
        chip: usize,
    },
    #[error(transparent)]
    Geometry(#[from] RasterError),
}
