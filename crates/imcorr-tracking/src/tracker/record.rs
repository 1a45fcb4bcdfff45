use imcorr_core::{sample_bilinear, GridGeometry, RasterView};
use imcorr_matcher::ChipMatch;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Elevation change between the source cell and the displaced target.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Elevation3d {
    /// Earlier-epoch elevation at the source cell.
    pub z: f64,
    /// Later-epoch elevation interpolated at the target position.
    pub z_target: f64,
    pub dz: f64,
    pub displacement_3d: f64,
    /// Degrees above the horizontal, negative downhill.
    pub slope: f64,
}

/// One accepted lattice point.
///
/// Positions and displacements are in world units, error estimates in cells.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DisplacementRecord {
    pub id: usize,
    pub gx: usize,
    pub gy: usize,
    pub x: f64,
    pub y: f64,
    pub displacement: f64,
    pub strength: f64,
    pub accepted: bool,
    pub dx: f64,
    pub dy: f64,
    /// Unit displacement vector, `(0, 0)` for a zero displacement.
    pub dir_x: f64,
    pub dir_y: f64,
    pub x_target: f64,
    pub y_target: f64,
    pub x_err: f64,
    pub y_err: f64,
    pub xy_err: f64,
    /// Compass bearing of the displacement in degrees, clockwise from +y.
    pub aspect: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation: Option<Elevation3d>,
}

impl DisplacementRecord {
    pub(crate) fn from_match(
        id: usize,
        (gx, gy): (usize, usize),
        m: &ChipMatch,
        geometry: &GridGeometry,
    ) -> Self {
        let source = geometry.grid_to_world(gx as f64, gy as f64);
        let dx = m.dx * geometry.cell_size;
        let dy = m.dy * geometry.cell_size;
        let displacement = dx.hypot(dy);
        let (dir_x, dir_y) = if displacement > 0.0 {
            (dx / displacement, dy / displacement)
        } else {
            (0.0, 0.0)
        };

        Self {
            id,
            gx,
            gy,
            x: source.x,
            y: source.y,
            displacement,
            strength: m.strength,
            accepted: true,
            dx,
            dy,
            dir_x,
            dir_y,
            x_target: source.x + dx,
            y_target: source.y + dy,
            x_err: m.err_x,
            y_err: m.err_y,
            xy_err: m.err_xy,
            aspect: aspect_degrees(dx, dy),
            elevation: None,
        }
    }

    /// Attach elevation fields; left empty when either sample is missing.
    pub(crate) fn with_elevation(
        mut self,
        earlier: &RasterView<'_>,
        later: &RasterView<'_>,
        geometry: &GridGeometry,
    ) -> Self {
        let z = earlier.value(self.gx as i64, self.gy as i64);
        let (tx, ty) = geometry.world_to_grid(Point2::new(self.x_target, self.y_target));
        let z_target = sample_bilinear(later, tx, ty);
        self.elevation = z
            .zip(z_target)
            .map(|(z, z_target)| Elevation3d::new(z, z_target, self.displacement));
        self
    }
}

impl Elevation3d {
    fn new(z: f64, z_target: f64, displacement: f64) -> Self {
        let dz = z_target - z;
        Self {
            z,
            z_target,
            dz,
            displacement_3d: dz.hypot(displacement),
            slope: slope_degrees(dz, displacement),
        }
    }
}

/// Bearing of `(dx, dy)` in `[0, 360)`, 0 for a zero vector.
pub(crate) fn aspect_degrees(dx: f64, dy: f64) -> f64 {
    if dx == 0.0 && dy == 0.0 {
        return 0.0;
    }
    let a = dx.atan2(dy).to_degrees().rem_euclid(360.0);
    // rem_euclid may round up to exactly 360
    if a >= 360.0 {
        0.0
    } else {
        a
    }
}

pub(crate) fn slope_degrees(dz: f64, displacement: f64) -> f64 {
    if displacement > 0.0 {
        (dz / displacement).atan().to_degrees()
    } else if dz == 0.0 {
        0.0
    } else {
        90.0_f64.copysign(dz)
    }
}
