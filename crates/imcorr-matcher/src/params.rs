use serde::{Deserialize, Serialize};

/// Side length of a square chip. Only powers of two are representable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub enum ChipSize {
    S16,
    S32,
    S64,
    S128,
    S256,
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("unsupported chip size {0} (expected one of 16, 32, 64, 128, 256)")]
pub struct InvalidChipSize(pub usize);

impl ChipSize {
    pub const ALL: [ChipSize; 5] = [
        ChipSize::S16,
        ChipSize::S32,
        ChipSize::S64,
        ChipSize::S128,
        ChipSize::S256,
    ];

    #[inline]
    pub const fn side(self) -> usize {
        match self {
            ChipSize::S16 => 16,
            ChipSize::S32 => 32,
            ChipSize::S64 => 64,
            ChipSize::S128 => 128,
            ChipSize::S256 => 256,
        }
    }

    #[inline]
    pub const fn area(self) -> usize {
        self.side() * self.side()
    }

    #[inline]
    pub const fn log2(self) -> u32 {
        self.side().trailing_zeros()
    }
}

impl TryFrom<usize> for ChipSize {
    type Error = InvalidChipSize;

    fn try_from(side: usize) -> Result<Self, Self::Error> {
        ChipSize::ALL
            .into_iter()
            .find(|s| s.side() == side)
            .ok_or(InvalidChipSize(side))
    }
}

impl From<ChipSize> for usize {
    fn from(s: ChipSize) -> usize {
        s.side()
    }
}

/// Surface model fitted to the 5x5 peak neighbourhood.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitMethod {
    /// z = value, unit weights.
    #[default]
    EllipticParaboloid,
    /// z = ln(value), weights value^2.
    EllipticGaussian,
    /// z = 1/value, weights value^4.
    ReciprocalParaboloid,
    /// No refinement: integer peak, fixed 0.5 cell error.
    None,
}

/// Minimal border distance (cells) of an acceptable correlation peak.
pub const DEFAULT_EDGE_MARGIN: usize = 2;
/// Side of the block around the peak excluded from background statistics.
pub const DEFAULT_BACKGROUND_EXCLUSION: usize = 9;
/// Strength bonus per close secondary peak.
pub const DEFAULT_SECONDARY_PEAK_BONUS: f64 = 0.2;
/// Per-sample variance floor applied to reference and local search windows.
pub const DEFAULT_VARIANCE_FLOOR: f64 = 0.01;
pub const DEFAULT_MIN_STRENGTH: f64 = 2.0;
/// Strength threshold that rejects uncorrelated chips.
///
/// The default threshold only screens flat or structureless surfaces: the
/// best peak of an uncorrelated 32-in-64 surface still scores around 6.
/// Genuine matches of textured chips score well above this value.
pub const NOISE_REJECTING_MIN_STRENGTH: f64 = 12.0;

/// Parameters of the per-point matching pipeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchParams {
    /// Chip cut from the earlier image and searched for.
    pub reference_chip: ChipSize,
    /// Chip cut from the later image; raised to `reference_chip` if smaller.
    pub search_chip: ChipSize,
    /// Minimal peak Strength to accept a match.
    pub min_strength: f64,
    pub fit_method: FitMethod,
    /// Maximal accepted displacement magnitude in cells.
    ///
    /// When unset, each axis is limited to half the search chip instead.
    pub max_displacement: Option<f64>,
    pub edge_margin: usize,
    pub background_exclusion: usize,
    pub secondary_peak_bonus: f64,
    pub variance_floor: f64,
}

impl Default for MatchParams {
    fn default() -> Self {
        Self {
            reference_chip: ChipSize::S32,
            search_chip: ChipSize::S64,
            min_strength: DEFAULT_MIN_STRENGTH,
            fit_method: FitMethod::default(),
            max_displacement: None,
            edge_margin: DEFAULT_EDGE_MARGIN,
            background_exclusion: DEFAULT_BACKGROUND_EXCLUSION,
            secondary_peak_bonus: DEFAULT_SECONDARY_PEAK_BONUS,
            variance_floor: DEFAULT_VARIANCE_FLOOR,
        }
    }
}

impl MatchParams {
    /// Return a copy with setup-time corrections applied.
    ///
    /// - the search chip is raised to the reference chip size,
    /// - the edge margin is at least 2 so the 5x5 fit window fits,
    /// - a non-positive or non-finite `max_displacement` is dropped,
    /// - a non-positive variance floor falls back to the default.
    pub fn normalized(&self) -> Self {
        let mut p = self.clone();
        if p.search_chip < p.reference_chip {
            log::info!(
                "search chip {} is smaller than reference chip {}; raising it",
                p.search_chip.side(),
                p.reference_chip.side()
            );
            p.search_chip = p.reference_chip;
        }
        p.edge_margin = p.edge_margin.max(DEFAULT_EDGE_MARGIN);
        p.background_exclusion = p.background_exclusion.max(1);
        p.max_displacement = p.max_displacement.filter(|d| d.is_finite() && *d > 0.0);
        if !(p.variance_floor.is_finite() && p.variance_floor > 0.0) {
            p.variance_floor = DEFAULT_VARIANCE_FLOOR;
        }
        p
    }
}
