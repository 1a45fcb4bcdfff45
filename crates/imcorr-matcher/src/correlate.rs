use crate::fft::{ComplexBuffer, FftDirection};
use crate::Chip;

/// Unnormalized cross products `sum S(r + row, c + col) * R(r, c)` for every
/// shift where the reference chip lies fully inside the search chip.
#[derive(Clone, Debug, PartialEq)]
pub struct RawCorrelation {
    pub cols: usize,
    pub rows: usize,
    pub data: Vec<f64>, // row-major, len = cols*rows
}

impl RawCorrelation {
    #[inline]
    pub fn get(&self, col: usize, row: usize) -> f64 {
        self.data[row * self.cols + col]
    }
}

/// Cross-correlate `reference` against `search` in the frequency domain.
///
/// Returns `None` when the reference chip is larger than the search chip.
pub fn cross_correlate(search: &Chip, reference: &Chip) -> Option<RawCorrelation> {
    if reference.size() > search.size() {
        return None;
    }
    let size = search.size();

    let mut s = ComplexBuffer::from_chip(search, size);
    let mut r = ComplexBuffer::from_chip(reference, size);
    s.fft_2d(FftDirection::Forward);
    r.fft_2d(FftDirection::Forward);
    s.mul_conj_assign(&r);
    s.fft_2d(FftDirection::Inverse);

    let n = search.side() - reference.side() + 1;
    let scale = 1.0 / size.area() as f64;
    let mut data = Vec::with_capacity(n * n);
    for row in 0..n {
        for col in 0..n {
            data.push(s.get(row, col).re * scale);
        }
    }
    Some(RawCorrelation {
        cols: n,
        rows: n,
        data,
    })
}
