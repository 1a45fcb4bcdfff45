//! Normalized correlation coefficients and the ranked peak list.

use crate::correlate::RawCorrelation;
use crate::Chip;

/// Capacity of [`PeakList`].
pub const MAX_PEAKS: usize = 32;

/// Surface sample, 0-based surface coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Peak {
    pub value: f64,
    pub col: usize,
    pub row: usize,
}

impl Peak {
    /// Chebyshev distance to `other` in surface cells.
    #[inline]
    pub fn distance(&self, other: &Peak) -> usize {
        self.col.abs_diff(other.col).max(self.row.abs_diff(other.row))
    }
}

/// Highest surface values, sorted descending, at most [`MAX_PEAKS`] entries.
///
/// Among equal values the earlier insertion ranks first.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PeakList {
    peaks: Vec<Peak>,
}

impl PeakList {
    pub fn new() -> Self {
        Self {
            peaks: Vec::with_capacity(MAX_PEAKS + 1),
        }
    }

    pub fn insert(&mut self, peak: Peak) {
        if !peak.value.is_finite() {
            return;
        }
        if self.peaks.len() == MAX_PEAKS
            && self.peaks.last().is_some_and(|p| p.value >= peak.value)
        {
            return;
        }
        let pos = self.peaks.partition_point(|p| p.value >= peak.value);
        self.peaks.insert(pos, peak);
        self.peaks.truncate(MAX_PEAKS);
    }

    #[inline]
    pub fn best(&self) -> Option<&Peak> {
        self.peaks.first()
    }

    #[inline]
    pub fn as_slice(&self) -> &[Peak] {
        &self.peaks
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.peaks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.peaks.is_empty()
    }
}

/// Normalized coefficients with their totals.
#[derive(Clone, Debug, PartialEq)]
pub struct CorrelationSurface {
    pub cols: usize,
    pub rows: usize,
    pub data: Vec<f64>, // row-major
    pub sum: f64,
    pub sum_sq: f64,
}

impl CorrelationSurface {
    #[inline]
    pub fn get(&self, col: usize, row: usize) -> f64 {
        self.data[row * self.cols + col]
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct NormalizedCorrelation {
    pub surface: CorrelationSurface,
    pub peaks: PeakList,
}

/// Sums and sums of squares of every `window`x`window` sub-square of a chip.
#[derive(Clone, Debug, PartialEq)]
pub struct WindowSums {
    /// Number of window positions per axis.
    pub positions: usize,
    pub sum: Vec<f64>,
    pub sum_sq: Vec<f64>,
}

impl WindowSums {
    #[inline]
    pub fn at(&self, col: usize, row: usize) -> (f64, f64) {
        let i = row * self.positions + col;
        (self.sum[i], self.sum_sq[i])
    }
}

/// Sliding-window sums over `chip`, updated incrementally.
///
/// Column band sums cover rows `row..row + window`; moving down one row adds
/// the entering row and drops the leaving one. Within a row of positions the
/// window moves right by adding the entering band and dropping the leaving one.
pub fn sliding_window_sums(chip: &Chip, window: usize) -> WindowSums {
    let n = chip.side();
    debug_assert!(window >= 1 && window <= n);
    let positions = n - window + 1;

    let mut band = vec![0.0; n];
    let mut band_sq = vec![0.0; n];
    for r in 0..window {
        for (c, &v) in chip.row(r).iter().enumerate() {
            band[c] += v;
            band_sq[c] += v * v;
        }
    }

    let mut sum = Vec::with_capacity(positions * positions);
    let mut sum_sq = Vec::with_capacity(positions * positions);
    for row in 0..positions {
        if row > 0 {
            let leaving = chip.row(row - 1);
            let entering = chip.row(row + window - 1);
            for c in 0..n {
                band[c] += entering[c] - leaving[c];
                band_sq[c] += entering[c] * entering[c] - leaving[c] * leaving[c];
            }
        }

        let mut s: f64 = band[..window].iter().sum();
        let mut sq: f64 = band_sq[..window].iter().sum();
        sum.push(s);
        sum_sq.push(sq);
        for col in 1..positions {
            s += band[col + window - 1] - band[col - 1];
            sq += band_sq[col + window - 1] - band_sq[col - 1];
            sum.push(s);
            sum_sq.push(sq);
        }
    }

    WindowSums {
        positions,
        sum,
        sum_sq,
    }
}

/// Convert raw cross products into correlation coefficients.
///
/// `variance_floor` bounds the per-sample variance of the reference chip and
/// of every local search window from below.
pub fn normalize(
    search: &Chip,
    reference: &Chip,
    raw: &RawCorrelation,
    variance_floor: f64,
) -> NormalizedCorrelation {
    let nr = reference.side();
    let count = (nr * nr) as f64;

    let ref_sum: f64 = reference.data().iter().sum();
    let ref_sum_sq: f64 = reference.data().iter().map(|v| v * v).sum();
    let ref_mean = ref_sum / count;
    let ref_var = ref_sum_sq / count - ref_mean * ref_mean;
    let ref_sigma = ref_var.max(variance_floor).sqrt();

    let local = sliding_window_sums(search, nr);
    debug_assert_eq!(local.positions, raw.cols);
    let local_floor = variance_floor * count * count;

    let mut data = Vec::with_capacity(raw.cols * raw.rows);
    let mut peaks = PeakList::new();
    let (mut sum, mut sum_sq) = (0.0, 0.0);
    for row in 0..raw.rows {
        for col in 0..raw.cols {
            let (s, sq) = local.at(col, row);
            let local_sigma = (count * sq - s * s).max(local_floor).sqrt();
            let value = (raw.get(col, row) - ref_mean * s) / (ref_sigma * local_sigma);
            sum += value;
            sum_sq += value * value;
            peaks.insert(Peak { value, col, row });
            data.push(value);
        }
    }

    NormalizedCorrelation {
        surface: CorrelationSurface {
            cols: raw.cols,
            rows: raw.rows,
            data,
            sum,
            sum_sq,
        },
        peaks,
    }
}
