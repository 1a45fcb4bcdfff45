//! End-to-end tracking runs driven by a [`TrackConfig`].

use crate::load::{load_raster, LoadError};
use imcorr_tracking::{FeatureTracker, TrackConfig, TrackInputs, TrackReport};
use std::path::{Path, PathBuf};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Resolve a path from the config relative to the config file's directory.
pub fn resolve_path(config_path: &Path, path: &str) -> PathBuf {
    let p = Path::new(path);
    if p.is_absolute() {
        return p.to_path_buf();
    }
    config_path
        .parent()
        .map(|dir| dir.join(p))
        .unwrap_or_else(|| p.to_path_buf())
}

/// Report path of a run without an explicit override: the config's
/// `output_path` (or its default) next to the config file.
pub fn report_path(cfg: &TrackConfig, config_path: &Path) -> PathBuf {
    resolve_path(config_path, &cfg.output_path().to_string_lossy())
}

/// Load the rasters named by `cfg` and track them.
///
/// File errors are returned; parameter and geometry errors are recorded in
/// the report's `error` field so a report is always written.
#[cfg_attr(feature = "tracing", instrument(level = "info", skip_all, fields(config = %config_path.display())))]
pub fn track_config(cfg: &TrackConfig, config_path: &Path) -> Result<TrackReport, LoadError> {
    let load = |p: &str| load_raster(resolve_path(config_path, p), cfg.no_data);
    let earlier = load(&cfg.earlier_image)?;
    let later = load(&cfg.later_image)?;
    let elevation = match cfg.elevation_paths() {
        Some((a, b)) => Some((load(a)?, load(b)?)),
        None => {
            if cfg.earlier_elevation.is_some() || cfg.later_elevation.is_some() {
                log::warn!("only one elevation raster configured; skipping 3-D output");
            }
            None
        }
    };

    let tracker = match FeatureTracker::new(cfg.params.clone()) {
        Ok(t) => t,
        Err(err) => {
            let mut report = TrackReport::new(cfg, config_path, cfg.params.clone());
            report.set_error(err);
            return Ok(report);
        }
    };
    let mut report = TrackReport::new(cfg, config_path, tracker.params().clone());

    let mut inputs = TrackInputs::new(earlier.view(), later.view(), cfg.geometry);
    if let Some((dem0, dem1)) = &elevation {
        inputs = inputs.with_elevation(dem0.view(), dem1.view());
    }
    match tracker.track(&inputs) {
        Ok(out) => report.set_output(out),
        Err(err) => {
            log::error!("tracking failed: {err}");
            report.set_error(err);
        }
    }
    Ok(report)
}
