//! Epoch rasters from image files.
//!
//! Integer images keep their sample values (8- and 16-bit grey, colour images
//! are converted to luma first). Float images are read as 32-bit luma.

use image::{DynamicImage, ImageBuffer, ImageReader, Luma, Pixel, Primitive};
use imcorr_core::{Raster, RasterError};
use std::path::Path;

#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: String,
        source: image::ImageError,
    },
    #[error(transparent)]
    Raster(#[from] RasterError),
}

/// Load a single-band raster from an image file.
///
/// Samples equal to `no_data` are treated as missing by the tracker.
pub fn load_raster(path: impl AsRef<Path>, no_data: Option<f64>) -> Result<Raster, LoadError> {
    let path = path.as_ref();
    let display = || path.display().to_string();
    let img = ImageReader::open(path)
        .map_err(|source| LoadError::Open {
            path: display(),
            source,
        })?
        .with_guessed_format()
        .map_err(|source| LoadError::Open {
            path: display(),
            source,
        })?
        .decode()
        .map_err(|source| LoadError::Decode {
            path: display(),
            source,
        })?;
    log::debug!(
        "loaded {} ({}x{}, {:?})",
        path.display(),
        img.width(),
        img.height(),
        img.color()
    );
    Ok(raster_from_image(&img)?.with_no_data(no_data))
}

/// Convert a decoded image to a raster of luma values.
pub fn raster_from_image(img: &DynamicImage) -> Result<Raster, RasterError> {
    match img {
        DynamicImage::ImageLuma8(gray) => raster_from_luma(gray),
        DynamicImage::ImageLuma16(gray) => raster_from_luma(gray),
        DynamicImage::ImageLumaA16(_)
        | DynamicImage::ImageRgb16(_)
        | DynamicImage::ImageRgba16(_) => raster_from_luma(&img.to_luma16()),
        DynamicImage::ImageRgb32F(_) | DynamicImage::ImageRgba32F(_) => {
            raster_from_luma(&img.to_luma32f())
        }
        _ => raster_from_luma(&img.to_luma8()),
    }
}

/// Convert a single-channel image buffer to a raster.
pub fn raster_from_luma<T>(img: &ImageBuffer<Luma<T>, Vec<T>>) -> Result<Raster, RasterError>
where
    T: Primitive + Into<f64>,
    Luma<T>: Pixel<Subpixel = T>,
{
    let data = img.pixels().map(|p| p.0[0].into()).collect();
    Raster::new(img.width() as usize, img.height() as usize, data)
}
