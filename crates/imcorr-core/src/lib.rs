//! Core types and utilities for image-correlation feature tracking.
//!
//! This crate is intentionally small. It does *not* read any file format;
//! rasters are borrowed from whatever owns the pixels.

mod geometry;
mod logger;
mod raster;

pub use geometry::GridGeometry;
pub use raster::{sample_bilinear, Raster, RasterError, RasterView};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;
