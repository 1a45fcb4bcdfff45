use serde::{Deserialize, Serialize};

/// Accepted match of a reference chip inside a search chip.
///
/// Displacements and errors are in cells; `dx` follows columns (x) and `dy`
/// follows rows (y).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChipMatch {
    pub dx: f64,
    pub dy: f64,
    pub strength: f64,
    pub err_x: f64,
    pub err_y: f64,
    pub err_xy: f64,
    /// Integer peak on the correlation surface (0-based column, row).
    pub peak_col: usize,
    pub peak_row: usize,
    /// Normalized correlation coefficient at the integer peak.
    pub peak_value: f64,
}

impl ChipMatch {
    #[inline]
    pub fn magnitude(&self) -> f64 {
        self.dx.hypot(self.dy)
    }
}
