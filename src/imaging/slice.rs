//! DICOM slice extraction.
//!
//! A DICOM file is reduced to one 8-bit grayscale slice: pick a
//! representative 2D plane out of whatever the decoder returns, scale the
//! intensities into 0..=255 and honor an inverted photometric interpretation.

use crate::error::TaskError;

use dicom_pixeldata::PixelDecoder;
use image::GrayImage;
use ndarray::{Array2, ArrayD, Axis, Ix2, IxDyn};
use std::path::Path;

const INVERTED_PHOTOMETRIC: &str = "MONOCHROME1";

/// Decodes a DICOM file into a normalized grayscale image.
pub fn decode_dicom(path: &Path) -> Result<GrayImage, TaskError> {
    let object = dicom_object::open_file(path).map_err(|e| decode_error(path, e))?;

    let inverted = object
        .element_by_name("PhotometricInterpretation")
        .ok()
        .and_then(|element| element.to_str().ok())
        .map(|value| value.trim().eq_ignore_ascii_case(INVERTED_PHOTOMETRIC))
        .unwrap_or(false);

    let pixel_data = object
        .decode_pixel_data()
        .map_err(|e| decode_error(path, e))?;
    let decoded = pixel_data
        .to_ndarray::<f32>()
        .map_err(|e| decode_error(path, e))?;

    // The decoder always answers frames x rows x cols x samples. Single
    // samples and single frames are dropped so a plain image is rows x cols
    // and a multi-frame series is frames x rows x cols.
    let mut shape = decoded.shape().to_vec();
    if shape.len() == 4 && shape[3] == 1 {
        shape.pop();
    }
    if shape.len() >= 3 && shape[0] == 1 {
        shape.remove(0);
    }
    let values: Vec<f32> = decoded.iter().copied().collect();
    let volume =
        ArrayD::from_shape_vec(IxDyn(&shape), values).map_err(|e| decode_error(path, e))?;

    let slice = representative_slice(volume)?;
    tracing::debug!(
        "Decoded DICOM {} to {:?} slice (inverted: {})",
        path.display(),
        slice.dim(),
        inverted
    );

    to_gray_image(normalize_intensities(slice, inverted))
}

/// Reduces a decoded pixel array to a single 2D plane.
///
/// A 3D stack yields its middle plane along the first axis. Singleton axes
/// are then dropped, and a 1D signal becomes two identical rows.
pub fn representative_slice(volume: ArrayD<f32>) -> Result<Array2<f32>, TaskError> {
    if volume.is_empty() {
        return Err(TaskError::ImageDecode("pixel array is empty".to_string()));
    }

    let array = if volume.ndim() == 3 {
        let middle = volume.shape()[0] / 2;
        volume.index_axis(Axis(0), middle).to_owned()
    } else {
        volume
    };
    let array = squeeze(array)?;

    let plane = match array.ndim() {
        1 => ndarray::stack(Axis(0), &[array.view(), array.view()])
            .map_err(|e| TaskError::ImageDecode(e.to_string()))?,
        2 => array,
        n => {
            return Err(TaskError::ImageDecode(format!(
                "unsupported pixel array with {} dimensions",
                n
            )))
        }
    };

    plane
        .into_dimensionality::<Ix2>()
        .map_err(|e| TaskError::ImageDecode(e.to_string()))
}

/// Clamps negatives to zero and scales by the maximum into 0..=255.
///
/// An all-zero slice stays black.
pub fn normalize_intensities(mut slice: Array2<f32>, inverted: bool) -> Array2<u8> {
    slice.mapv_inplace(|value| if value.is_nan() || value < 0.0 { 0.0 } else { value });

    let max = slice.iter().copied().fold(0.0f32, f32::max);
    let scale = if max > 0.0 { max } else { 1.0 };

    slice.mapv(|value| {
        let level = (value / scale * 255.0) as u8;
        if inverted {
            255 - level
        } else {
            level
        }
    })
}

fn to_gray_image(pixels: Array2<u8>) -> Result<GrayImage, TaskError> {
    let (rows, cols) = pixels.dim();
    let data: Vec<u8> = pixels.iter().copied().collect();

    GrayImage::from_raw(cols as u32, rows as u32, data).ok_or_else(|| {
        TaskError::ImageDecode(format!("cannot build {}x{} image from slice", cols, rows))
    })
}

fn squeeze(array: ArrayD<f32>) -> Result<ArrayD<f32>, TaskError> {
    let mut dims: Vec<usize> = array.shape().iter().copied().filter(|&d| d != 1).collect();
    if dims.is_empty() {
        dims.push(1);
    }

    array
        .into_shape_with_order(IxDyn(&dims))
        .map_err(|e| TaskError::ImageDecode(e.to_string()))
}

fn decode_error(path: &Path, error: impl std::fmt::Display) -> TaskError {
    TaskError::ImageDecode(format!("{}: {}", path.display(), error))
}
