use super::{
    DisplacementRecord, LatticeSpec, NoopObserver, TrackError, TrackObserver, TrackParams,
    TrackSummary,
};
use imcorr_core::{GridGeometry, RasterView};
use imcorr_matcher::{ChipMatch, ChipMatcher, Rejection};
use std::sync::atomic::{AtomicUsize, Ordering};

#[cfg(feature = "rayon")]
use rayon::prelude::*;
#[cfg(feature = "tracing")]
use tracing::instrument;

/// Elevation rasters on the image lattice, one per epoch.
#[derive(Clone, Copy, Debug)]
pub struct ElevationPair<'a> {
    pub earlier: RasterView<'a>,
    pub later: RasterView<'a>,
}

/// Rasters of one tracking run. All rasters share `geometry`.
#[derive(Clone, Copy, Debug)]
pub struct TrackInputs<'a> {
    pub earlier: RasterView<'a>,
    pub later: RasterView<'a>,
    pub geometry: GridGeometry,
    pub elevation: Option<ElevationPair<'a>>,
}

impl<'a> TrackInputs<'a> {
    pub fn new(earlier: RasterView<'a>, later: RasterView<'a>, geometry: GridGeometry) -> Self {
        Self {
            earlier,
            later,
            geometry,
            elevation: None,
        }
    }

    pub fn with_elevation(mut self, earlier: RasterView<'a>, later: RasterView<'a>) -> Self {
        self.elevation = Some(ElevationPair { earlier, later });
        self
    }

    fn validate(&self) -> Result<(), TrackError> {
        self.geometry.validate()?;
        if !self.earlier.same_shape(&self.later) {
            return Err(TrackError::GeometryMismatch {
                earlier: (self.earlier.width, self.earlier.height),
                later: (self.later.width, self.later.height),
            });
        }
        if let Some(dem) = &self.elevation {
            for v in [&dem.earlier, &dem.later] {
                if !v.same_shape(&self.earlier) {
                    return Err(TrackError::ElevationMismatch {
                        expected: (self.earlier.width, self.earlier.height),
                        found: (v.width, v.height),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Records of the accepted points, in lattice order, and run counts.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrackOutput {
    pub records: Vec<DisplacementRecord>,
    pub summary: TrackSummary,
}

/// Runs the matcher over every lattice point of a pair of rasters.
#[derive(Clone, Debug)]
pub struct FeatureTracker {
    params: TrackParams,
    matcher: ChipMatcher,
}

impl FeatureTracker {
    pub fn new(params: TrackParams) -> Result<Self, TrackError> {
        if !(params.grid_spacing.is_finite() && params.grid_spacing > 0.0) {
            return Err(TrackError::InvalidGridSpacing(params.grid_spacing));
        }
        let matcher = ChipMatcher::new(params.matching.clone());
        let params = TrackParams {
            matching: matcher.params().clone(),
            ..params
        };
        Ok(Self { params, matcher })
    }

    /// Effective parameters (matching parameters normalized).
    #[inline]
    pub fn params(&self) -> &TrackParams {
        &self.params
    }

    #[inline]
    pub fn matcher(&self) -> &ChipMatcher {
        &self.matcher
    }

    /// Lattice of sample centres for a raster of the given size.
    pub fn lattice(
        &self,
        width: usize,
        height: usize,
        geometry: &GridGeometry,
    ) -> Result<LatticeSpec, TrackError> {
        let search = self.params.matching.search_chip;
        let step = geometry.spacing_in_cells(self.params.grid_spacing);
        LatticeSpec::new(width, height, search, step).ok_or(TrackError::RasterTooSmall {
            width,
            height,
            chip: search.side(),
        })
    }

    pub fn track(&self, inputs: &TrackInputs<'_>) -> Result<TrackOutput, TrackError> {
        self.track_with_observer(inputs, &NoopObserver)
    }

    /// Track every lattice point, reporting progress to `observer`.
    ///
    /// When `observer` asks to stop, the remaining points are skipped and the
    /// records gathered so far are returned with `summary.cancelled` set.
    #[cfg_attr(
        feature = "tracing",
        instrument(
            level = "info",
            skip_all,
            fields(width = inputs.earlier.width, height = inputs.earlier.height)
        )
    )]
    pub fn track_with_observer(
        &self,
        inputs: &TrackInputs<'_>,
        observer: &dyn TrackObserver,
    ) -> Result<TrackOutput, TrackError> {
        inputs.validate()?;
        let lattice = self.lattice(inputs.earlier.width, inputs.earlier.height, &inputs.geometry)?;
        let points: Vec<(usize, usize)> = lattice.points().collect();
        let total = points.len();

        let chips = &self.params.matching;
        log::info!(
            "tracking {}x{} raster: reference chip {}, search chip {}, step {} cells, {} lattice points",
            inputs.earlier.width,
            inputs.earlier.height,
            chips.reference_chip.side(),
            chips.search_chip.side(),
            lattice.step,
            total
        );

        let done = AtomicUsize::new(0);
        let visit = |&(gx, gy): &(usize, usize)| -> Option<Result<ChipMatch, Rejection>> {
            if observer.should_stop() {
                return None;
            }
            let res = self.matcher.match_at(&inputs.earlier, &inputs.later, gx, gy);
            observer.on_progress(done.fetch_add(1, Ordering::Relaxed) + 1, total);
            Some(res)
        };

        #[cfg(feature = "rayon")]
        let outcomes: Vec<_> = points.par_iter().map(visit).collect();
        #[cfg(not(feature = "rayon"))]
        let outcomes: Vec<_> = points.iter().map_while(visit).map(Some).collect();

        let mut summary = TrackSummary {
            lattice_points: total,
            ..TrackSummary::default()
        };
        let mut records = Vec::new();
        for (&point, outcome) in points.iter().zip(&outcomes) {
            let Some(outcome) = outcome else {
                summary.cancelled = true;
                continue;
            };
            summary.visited += 1;
            match outcome {
                Ok(m) => {
                    let mut record =
                        DisplacementRecord::from_match(records.len(), point, m, &inputs.geometry);
                    if let Some(dem) = &inputs.elevation {
                        record = record.with_elevation(&dem.earlier, &dem.later, &inputs.geometry);
                    }
                    records.push(record);
                }
                Err(rejection) => {
                    log::debug!("point ({}, {}) rejected: {rejection}", point.0, point.1);
                    summary.rejected.record(rejection);
                }
            }
        }
        summary.accepted = records.len();
        summary.cancelled |= outcomes.len() < total;

        log::info!(
            "tracking done: {} of {} points visited, {} accepted, rejected {:?}{}",
            summary.visited,
            total,
            summary.accepted,
            summary.rejected,
            if summary.cancelled { " (cancelled)" } else { "" }
        );

        Ok(TrackOutput { records, summary })
    }
}
