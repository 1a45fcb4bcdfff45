use super::{ChipMatch, Rejection};
use crate::chip::{chip_origin, Chip};
use crate::correlate::cross_correlate;
use crate::evaluate::evaluate_peak;
use crate::fit::fit_peak;
use crate::normalize::normalize;
use crate::MatchParams;
use imcorr_core::RasterView;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Matches a reference chip from the earlier image inside a search chip
/// from the later image.
///
/// Holds no scratch state, so one matcher can be shared by worker threads.
#[derive(Clone, Debug)]
pub struct ChipMatcher {
    params: MatchParams,
}

impl ChipMatcher {
    /// Create a matcher; `params` are normalized first.
    pub fn new(params: MatchParams) -> Self {
        Self {
            params: params.normalized(),
        }
    }

    /// Effective parameters.
    #[inline]
    pub fn params(&self) -> &MatchParams {
        &self.params
    }

    /// Match `reference` inside `search`.
    ///
    /// The displacement is measured from the nominal alignment where both
    /// chip centres coincide.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "trace", skip_all, fields(search = search.side(), reference = reference.side()))
    )]
    pub fn match_chips(&self, search: &Chip, reference: &Chip) -> Result<ChipMatch, Rejection> {
        let p = &self.params;
        let raw = cross_correlate(search, reference).ok_or(Rejection::ChipSizeMismatch {
            reference: reference.side(),
            search: search.side(),
        })?;
        let norm = normalize(search, reference, &raw, p.variance_floor);
        let eval = evaluate_peak(&norm.surface, &norm.peaks, p)?;
        let fit = fit_peak(&eval.neighborhood, p.fit_method)?;

        let nominal = ((search.side() - reference.side()) / 2) as f64;
        let dx = eval.peak.col as f64 - nominal + fit.dx;
        let dy = eval.peak.row as f64 - nominal + fit.dy;
        check_displacement(dx, dy, search.side(), p.max_displacement)?;

        Ok(ChipMatch {
            dx,
            dy,
            strength: eval.strength,
            err_x: fit.err_x,
            err_y: fit.err_y,
            err_xy: fit.err_xy,
            peak_col: eval.peak.col,
            peak_row: eval.peak.row,
            peak_value: eval.peak.value,
        })
    }

    /// Cut both chips centred on cell `(gx, gy)` and match them.
    ///
    /// The reference chip comes from `earlier`, the search chip from `later`.
    /// Windows that leave either raster or touch a no-data sample are
    /// rejected with [`Rejection::NoData`].
    pub fn match_at(
        &self,
        earlier: &RasterView<'_>,
        later: &RasterView<'_>,
        gx: usize,
        gy: usize,
    ) -> Result<ChipMatch, Rejection> {
        let (rs, ss) = (self.params.reference_chip, self.params.search_chip);
        let (rx, ry) = chip_origin(gx, gy, rs);
        let (sx, sy) = chip_origin(gx, gy, ss);
        if !earlier.window_is_complete(rx, ry, rs.side())
            || !later.window_is_complete(sx, sy, ss.side())
        {
            return Err(Rejection::NoData);
        }

        let reference = Chip::extract(earlier, gx, gy, rs);
        let search = Chip::extract(later, gx, gy, ss);
        self.match_chips(&search, &reference)
    }
}

/// Reject displacements beyond `max` (when set) or beyond half the search
/// chip on either axis.
fn check_displacement(dx: f64, dy: f64, search_side: usize, max: Option<f64>) -> Result<(), Rejection> {
    let magnitude = dx.hypot(dy);
    let excess = match max {
        Some(max) => magnitude > max,
        None => {
            let limit = (search_side / 2) as f64;
            dx * dx > limit * limit || dy * dy > limit * limit
        }
    };
    if excess {
        Err(Rejection::ExcessDisplacement { magnitude })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ChipSize, FitMethod};
    use imcorr_core::Raster;

    fn pattern(x: f64, y: f64) -> f64 {
        100.0
            + 20.0 * (0.31 * x + 0.12 * y).sin()
            + 18.0 * (0.37 * y - 0.09 * x + 1.1).sin()
            + 16.0 * (0.22 * x + 0.27 * y + 2.3).sin()
            + 15.0 * (0.36 * x - 0.17 * y + 0.7).sin()
            + 12.0 * (0.27 * x - 0.33 * y + 0.4).sin()
            + 11.0 * (0.08 * y - 0.41 * x + 2.8).sin()
    }

    #[test]
    fn displacement_gate() {
        assert!(check_displacement(31.0, 0.0, 64, None).is_ok());
        assert!(matches!(
            check_displacement(0.0, -32.5, 64, None),
            Err(Rejection::ExcessDisplacement { .. })
        ));
        assert!(check_displacement(3.0, 4.0, 64, Some(5.0)).is_ok());
        assert_eq!(
            check_displacement(3.0, 4.1, 64, Some(5.0)).map_err(|e| matches!(e, Rejection::ExcessDisplacement { .. })),
            Err(true)
        );
    }

    #[test]
    fn integer_shift_with_fit_disabled() {
        let earlier = Raster::from_fn(128, 128, |x, y| pattern(x as f64, y as f64)).unwrap();
        let later = Raster::from_fn(128, 128, |x, y| pattern(x as f64 - 4.0, y as f64 + 2.0)).unwrap();
        let matcher = ChipMatcher::new(MatchParams {
            fit_method: FitMethod::None,
            ..MatchParams::default()
        });
        let m = matcher.match_at(&earlier.view(), &later.view(), 63, 63).unwrap();
        assert_eq!((m.dx, m.dy), (4.0, -2.0));
        assert_eq!((m.err_x, m.err_y), (0.5, 0.5));
    }

    #[test]
    fn window_outside_raster_is_no_data() {
        let r = Raster::from_fn(64, 64, |x, y| pattern(x as f64, y as f64)).unwrap();
        let matcher = ChipMatcher::new(MatchParams::default());
        assert_eq!(
            matcher.match_at(&r.view(), &r.view(), 10, 40),
            Err(Rejection::NoData)
        );
    }

    #[test]
    fn oversized_reference_chip_is_reported() {
        let matcher = ChipMatcher::new(MatchParams::default());
        let small = Chip::from_fn(ChipSize::S16, |r, c| (r * c) as f64);
        let big = Chip::from_fn(ChipSize::S32, |r, c| (r + c) as f64);
        assert_eq!(
            matcher.match_chips(&small, &big),
            Err(Rejection::ChipSizeMismatch {
                reference: 32,
                search: 16
            })
        );
    }
}
