use crate::ChipSize;
use imcorr_core::RasterView;

/// Square window copied out of a raster, row-major (`row` = y, `col` = x).
#[derive(Clone, Debug, PartialEq)]
pub struct Chip {
    size: ChipSize,
    data: Vec<f64>,
}

impl Chip {
    /// Build a chip by evaluating `f(row, col)` at every element.
    pub fn from_fn(size: ChipSize, mut f: impl FnMut(usize, usize) -> f64) -> Self {
        let n = size.side();
        let mut data = Vec::with_capacity(n * n);
        for row in 0..n {
            for col in 0..n {
                data.push(f(row, col));
            }
        }
        Self { size, data }
    }

    /// Cut the `size` window centred on cell `(gx, gy)`.
    ///
    /// Element `(row, col)` holds raster cell
    /// `(gx + col - N/2 + 1, gy + row - N/2 + 1)`. The caller guarantees that
    /// the window lies inside the raster (see [`chip_origin`]).
    pub fn extract(raster: &RasterView<'_>, gx: usize, gy: usize, size: ChipSize) -> Self {
        let n = size.side();
        let x0 = gx + 1 - n / 2;
        let y0 = gy + 1 - n / 2;
        debug_assert!(x0 + n <= raster.width && y0 + n <= raster.height);
        let mut data = Vec::with_capacity(n * n);
        for y in y0..y0 + n {
            let start = y * raster.width + x0;
            data.extend_from_slice(&raster.data[start..start + n]);
        }
        Self { size, data }
    }

    #[inline]
    pub fn size(&self) -> ChipSize {
        self.size
    }

    #[inline]
    pub fn side(&self) -> usize {
        self.size.side()
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.side() + col]
    }

    #[inline]
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    #[inline]
    pub fn row(&self, row: usize) -> &[f64] {
        let n = self.side();
        &self.data[row * n..(row + 1) * n]
    }
}

/// Top-left raster cell of the `size` window centred on `(gx, gy)`.
///
/// May be negative; use it to check that the window fits before calling
/// [`Chip::extract`].
#[inline]
pub fn chip_origin(gx: usize, gy: usize, size: ChipSize) -> (i64, i64) {
    let half = (size.side() / 2) as i64;
    (gx as i64 - half + 1, gy as i64 - half + 1)
}
