use imcorr_matcher::ChipSize;

/// Sample centres where a full search chip fits inside the raster.
///
/// Centres start at `N/2 - 1` and stay below `size - N/2` on both axes,
/// stepping by `step` cells. Points are visited column by column: x outer,
/// y inner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LatticeSpec {
    pub x_start: usize,
    pub x_end: usize,
    pub y_start: usize,
    pub y_end: usize,
    pub step: usize,
}

impl LatticeSpec {
    /// `None` when the raster is smaller than the search chip.
    pub fn new(width: usize, height: usize, search: ChipSize, step: usize) -> Option<Self> {
        let half = search.side() / 2;
        if width < search.side() || height < search.side() {
            return None;
        }
        Some(Self {
            x_start: half - 1,
            x_end: width - half,
            y_start: half - 1,
            y_end: height - half,
            step: step.max(1),
        })
    }

    #[inline]
    pub fn cols(&self) -> usize {
        (self.x_end - self.x_start).div_ceil(self.step)
    }

    #[inline]
    pub fn rows(&self) -> usize {
        (self.y_end - self.y_start).div_ceil(self.step)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cols() * self.rows()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn points(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (self.x_start..self.x_end)
            .step_by(self.step)
            .flat_map(move |gx| (self.y_start..self.y_end).step_by(self.step).map(move |gy| (gx, gy)))
    }
}
