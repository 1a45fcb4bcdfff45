/// Errors raised when wrapping a pixel buffer into a raster.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum RasterError {
    #[error("invalid raster dimensions (width={width}, height={height})")]
    InvalidDimensions { width: usize, height: usize },
    #[error("invalid raster buffer length (expected {expected} samples, got {got})")]
    InvalidBuffer { expected: usize, got: usize },
    #[error("cell size must be positive and finite (got {0})")]
    InvalidCellSize(f64),
}

fn check_layout(width: usize, height: usize, len: usize) -> Result<(), RasterError> {
    let expected = width
        .checked_mul(height)
        .filter(|&n| n > 0)
        .ok_or(RasterError::InvalidDimensions { width, height })?;
    if len != expected {
        return Err(RasterError::InvalidBuffer { expected, got: len });
    }
    Ok(())
}

/// Borrowed single-band raster, row-major.
///
/// Row `y` holds the cells whose world y coordinate is `y_min + y * cell_size`
/// (see [`crate::GridGeometry`]).
#[derive(Clone, Copy, Debug)]
pub struct RasterView<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [f64], // row-major, len = w*h
    /// Sentinel marking missing samples.
    pub no_data: Option<f64>,
}

impl<'a> RasterView<'a> {
    pub fn new(width: usize, height: usize, data: &'a [f64]) -> Result<Self, RasterError> {
        check_layout(width, height, data.len())?;
        Ok(Self {
            width,
            height,
            data,
            no_data: None,
        })
    }

    pub fn with_no_data(mut self, no_data: Option<f64>) -> Self {
        self.no_data = no_data;
        self
    }

    /// Raw sample. Panics when `(x, y)` is outside the raster.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f64 {
        self.data[y * self.width + x]
    }

    /// Whether a raw sample counts as real data.
    #[inline]
    pub fn is_data(&self, v: f64) -> bool {
        v.is_finite() && self.no_data.is_none_or(|nd| v != nd)
    }

    /// Sample at `(x, y)`, `None` when outside the raster or missing.
    #[inline]
    pub fn value(&self, x: i64, y: i64) -> Option<f64> {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return None;
        }
        let v = self.get(x as usize, y as usize);
        self.is_data(v).then_some(v)
    }

    /// `true` if every sample of the `size`x`size` window starting at
    /// `(x0, y0)` is inside the raster and holds data.
    pub fn window_is_complete(&self, x0: i64, y0: i64, size: usize) -> bool {
        if x0 < 0 || y0 < 0 {
            return false;
        }
        let (x0, y0) = (x0 as usize, y0 as usize);
        if x0 + size > self.width || y0 + size > self.height {
            return false;
        }
        (y0..y0 + size).all(|y| {
            self.data[y * self.width + x0..y * self.width + x0 + size]
                .iter()
                .all(|&v| self.is_data(v))
        })
    }

    #[inline]
    pub fn same_shape(&self, other: &RasterView<'_>) -> bool {
        self.width == other.width && self.height == other.height
    }
}

/// Owned single-band raster.
#[derive(Clone, Debug, PartialEq)]
pub struct Raster {
    pub width: usize,
    pub height: usize,
    pub data: Vec<f64>,
    pub no_data: Option<f64>,
}

impl Raster {
    pub fn new(width: usize, height: usize, data: Vec<f64>) -> Result<Self, RasterError> {
        check_layout(width, height, data.len())?;
        Ok(Self {
            width,
            height,
            data,
            no_data: None,
        })
    }

    /// Build a raster by evaluating `f(x, y)` at every cell.
    pub fn from_fn(
        width: usize,
        height: usize,
        mut f: impl FnMut(usize, usize) -> f64,
    ) -> Result<Self, RasterError> {
        check_layout(width, height, width.saturating_mul(height))?;
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self::new(width, height, data)
    }

    pub fn with_no_data(mut self, no_data: Option<f64>) -> Self {
        self.no_data = no_data;
        self
    }

    pub fn view(&self) -> RasterView<'_> {
        RasterView {
            width: self.width,
            height: self.height,
            data: &self.data,
            no_data: self.no_data,
        }
    }
}

/// Bilinear sample at fractional cell coordinates.
///
/// Returns `None` if any contributing neighbour is outside the raster or
/// missing. Neighbours with zero weight are not required, so integer
/// coordinates on the last row/column are still sampled.
pub fn sample_bilinear(src: &RasterView<'_>, x: f64, y: f64) -> Option<f64> {
    if !x.is_finite() || !y.is_finite() {
        return None;
    }
    let x0 = x.floor();
    let y0 = y.floor();
    let fx = x - x0;
    let fy = y - y0;
    let (x0, y0) = (x0 as i64, y0 as i64);

    let p00 = src.value(x0, y0)?;
    let p10 = if fx > 0.0 { src.value(x0 + 1, y0)? } else { p00 };
    let p01 = if fy > 0.0 { src.value(x0, y0 + 1)? } else { p00 };
    let p11 = if fx > 0.0 && fy > 0.0 {
        src.value(x0 + 1, y0 + 1)?
    } else if fx > 0.0 {
        p10
    } else {
        p01
    };

    let a = p00 + fx * (p10 - p00);
    let b = p01 + fx * (p11 - p01);
    Some(a + fy * (b - a))
}
