//! JSON configuration and report helpers for tracking runs.

use crate::{DisplacementRecord, TrackError, TrackOutput, TrackParams, TrackSummary};
use imcorr_core::GridGeometry;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

#[derive(thiserror::Error, Debug)]
pub enum TrackIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Configuration of a tracking run from image files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackConfig {
    /// Earlier-epoch image; reference chips are cut from it.
    pub earlier_image: String,
    /// Later-epoch image; search chips are cut from it.
    pub later_image: String,
    #[serde(default)]
    pub earlier_elevation: Option<String>,
    #[serde(default)]
    pub later_elevation: Option<String>,
    #[serde(default)]
    pub geometry: GridGeometry,
    /// Sample value treated as missing in every input raster.
    #[serde(default)]
    pub no_data: Option<f64>,
    #[serde(default)]
    pub params: TrackParams,
    #[serde(default)]
    pub output_path: Option<String>,
}

impl TrackConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, TrackIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), TrackIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Configured report path, `imcorr_report.json` when unset.
    ///
    /// Relative paths are left as they are; the CLI resolves them against
    /// the config file's directory like the input paths.
    pub fn output_path(&self) -> PathBuf {
        self.output_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("imcorr_report.json"))
    }

    /// Elevation paths when both epochs are configured.
    pub fn elevation_paths(&self) -> Option<(&str, &str)> {
        self.earlier_elevation
            .as_deref()
            .zip(self.later_elevation.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackReport {
    pub config_path: String,
    pub earlier_image: String,
    pub later_image: String,
    pub geometry: GridGeometry,
    /// Parameters in effect after normalization.
    pub params: TrackParams,
    #[serde(default)]
    pub summary: Option<TrackSummary>,
    #[serde(default)]
    pub records: Vec<DisplacementRecord>,
    #[serde(default)]
    pub error: Option<String>,
}

impl TrackReport {
    /// Build an empty report from the input config.
    pub fn new(cfg: &TrackConfig, config_path: &Path, params: TrackParams) -> Self {
        Self {
            config_path: config_path.to_string_lossy().into_owned(),
            earlier_image: cfg.earlier_image.clone(),
            later_image: cfg.later_image.clone(),
            geometry: cfg.geometry,
            params,
            summary: None,
            records: Vec::new(),
            error: None,
        }
    }

    /// Populate report fields from a finished run.
    pub fn set_output(&mut self, out: TrackOutput) {
        self.summary = Some(out.summary);
        self.records = out.records;
        self.error = None;
    }

    /// Record a run error.
    pub fn set_error(&mut self, err: TrackError) {
        self.error = Some(err.to_string());
    }

    /// Load a report from JSON on disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, TrackIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this report to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), TrackIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
