//! Radix-2 2D FFT on square power-of-two buffers.
//!
//! Transforms are unnormalized in both directions: a forward pass followed by
//! an inverse pass scales the data by `rows * cols`. Callers divide once.

use crate::{Chip, ChipSize};
use nalgebra::Complex;
use std::f64::consts::TAU;
use std::sync::OnceLock;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FftDirection {
    Forward,
    Inverse,
}

impl FftDirection {
    #[inline]
    fn sign(self) -> f64 {
        match self {
            FftDirection::Forward => -1.0,
            FftDirection::Inverse => 1.0,
        }
    }
}

/// Interleaved complex samples of a `rows x cols` grid, row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct ComplexBuffer {
    rows: usize,
    cols: usize,
    data: Vec<Complex<f64>>,
}

impl ComplexBuffer {
    pub fn zeros(size: ChipSize) -> Self {
        let n = size.side();
        Self {
            rows: n,
            cols: n,
            data: vec![Complex::new(0.0, 0.0); n * n],
        }
    }

    /// Embed a real chip top-left aligned into a `size` buffer, zero padded.
    pub fn from_chip(chip: &Chip, size: ChipSize) -> Self {
        debug_assert!(chip.size() <= size);
        let mut buf = Self::zeros(size);
        let n = chip.side();
        for row in 0..n {
            let dst = &mut buf.data[row * buf.cols..row * buf.cols + n];
            for (d, &v) in dst.iter_mut().zip(chip.row(row)) {
                *d = Complex::new(v, 0.0);
            }
        }
        buf
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Complex<f64> {
        self.data[row * self.cols + col]
    }

    #[inline]
    pub fn as_slice(&self) -> &[Complex<f64>] {
        &self.data
    }

    /// Replace `self` with `self * conj(other)` element-wise.
    pub fn mul_conj_assign(&mut self, other: &ComplexBuffer) {
        debug_assert_eq!(self.data.len(), other.data.len());
        for (a, b) in self.data.iter_mut().zip(&other.data) {
            *a *= b.conj();
        }
    }

    /// 2D transform in place: every row, then every column.
    pub fn fft_2d(&mut self, direction: FftDirection) {
        let cols = self.cols;
        for row in self.data.chunks_exact_mut(cols) {
            fft_1d(row, direction);
        }

        let mut column = vec![Complex::new(0.0, 0.0); self.rows];
        for col in 0..cols {
            for (row, c) in column.iter_mut().enumerate() {
                *c = self.data[row * cols + col];
            }
            fft_1d(&mut column, direction);
            for (row, c) in column.iter().enumerate() {
                self.data[row * cols + col] = *c;
            }
        }
    }
}

const MAX_LOG2: usize = 16;

static BIT_REVERSAL: [OnceLock<Box<[u32]>>; MAX_LOG2 + 1] = [const { OnceLock::new() }; MAX_LOG2 + 1];

/// Bit-reversal permutation for length `n = 2^k`, built once per length.
fn bit_reversal_table(n: usize) -> &'static [u32] {
    let bits = n.trailing_zeros();
    debug_assert!(n.is_power_of_two() && (bits as usize) <= MAX_LOG2);
    BIT_REVERSAL[bits as usize].get_or_init(|| {
        (0..n as u32)
            .map(|i| if bits == 0 { 0 } else { i.reverse_bits() >> (32 - bits) })
            .collect()
    })
}

/// In-place iterative radix-2 transform of a power-of-two slice.
fn fft_1d(data: &mut [Complex<f64>], direction: FftDirection) {
    let n = data.len();
    if n < 2 {
        return;
    }

    for (i, &j) in bit_reversal_table(n).iter().enumerate() {
        let j = j as usize;
        if i < j {
            data.swap(i, j);
        }
    }

    let sign = direction.sign();
    let mut len = 2;
    while len <= n {
        let half = len / 2;
        let theta = sign * TAU / len as f64;
        for k in 0..half {
            let w = Complex::from_polar(1.0, theta * k as f64);
            for start in (0..n).step_by(len) {
                let a = data[start + k];
                let b = data[start + k + half] * w;
                data[start + k] = a + b;
                data[start + k + half] = a - b;
            }
        }
        len <<= 1;
    }
}
