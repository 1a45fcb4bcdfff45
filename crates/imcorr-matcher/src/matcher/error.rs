/// Reason a sample point produced no displacement.
///
/// Rejections are an expected outcome of matching and do not abort a run.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum Rejection {
    #[error("chip window leaves the raster or holds no-data samples")]
    NoData,
    #[error("correlation peak too close to the surface border")]
    Edge,
    #[error("no distinct secondary peak or background")]
    Ambiguous,
    #[error("correlation strength {strength:.3} below minimum")]
    Weak { strength: f64 },
    #[error("sub-pixel surface fit is singular")]
    SingularFit,
    #[error("displacement {magnitude:.3} exceeds the accepted range")]
    ExcessDisplacement { magnitude: f64 },
    #[error("reference chip {reference} larger than search chip {search}")]
    ChipSizeMismatch { reference: usize, search: usize },
}
