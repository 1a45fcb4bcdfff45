use crate::RasterError;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Placement of a raster's cell lattice in world (map) units.
///
/// Cell `(gx, gy)` sits at `(x_min + gx * cell_size, y_min + gy * cell_size)`;
/// both indices grow with the world axes.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridGeometry {
    pub x_min: f64,
    pub y_min: f64,
    pub cell_size: f64,
}

impl Default for GridGeometry {
    fn default() -> Self {
        Self {
            x_min: 0.0,
            y_min: 0.0,
            cell_size: 1.0,
        }
    }
}

impl GridGeometry {
    pub fn new(x_min: f64, y_min: f64, cell_size: f64) -> Result<Self, RasterError> {
        let g = Self {
            x_min,
            y_min,
            cell_size,
        };
        g.validate()?;
        Ok(g)
    }

    pub fn validate(&self) -> Result<(), RasterError> {
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return Err(RasterError::InvalidCellSize(self.cell_size));
        }
        Ok(())
    }

    #[inline]
    pub fn grid_to_world(&self, gx: f64, gy: f64) -> Point2<f64> {
        Point2::new(
            self.x_min + gx * self.cell_size,
            self.y_min + gy * self.cell_size,
        )
    }

    /// Fractional cell coordinates of a world position.
    #[inline]
    pub fn world_to_grid(&self, p: Point2<f64>) -> (f64, f64) {
        (
            (p.x - self.x_min) / self.cell_size,
            (p.y - self.y_min) / self.cell_size,
        )
    }

    /// Lattice step in cells for a spacing given in world units (at least 1).
    pub fn spacing_in_cells(&self, spacing: f64) -> usize {
        let step = (spacing / self.cell_size).floor();
        if step.is_finite() && step >= 1.0 {
            step as usize
        } else {
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn grid_world_round_trip() {
        let g = GridGeometry::new(500.0, 1200.0, 2.5).expect("geometry");
        let p = g.grid_to_world(4.0, 10.0);
        assert_relative_eq!(p.x, 510.0);
        assert_relative_eq!(p.y, 1225.0);
        let (gx, gy) = g.world_to_grid(p);
        assert_relative_eq!(gx, 4.0);
        assert_relative_eq!(gy, 10.0);
    }

    #[test]
    fn spacing_is_floored_and_at_least_one() {
        let g = GridGeometry::new(0.0, 0.0, 3.0).expect("geometry");
        assert_eq!(g.spacing_in_cells(10.0), 3);
        assert_eq!(g.spacing_in_cells(1.0), 1);
        assert_eq!(g.spacing_in_cells(f64::NAN), 1);
    }

    #[test]
    fn rejects_non_positive_cell_size() {
        assert_eq!(
            GridGeometry::new(0.0, 0.0, 0.0),
            Err(RasterError::InvalidCellSize(0.0))
        );
    }
}
