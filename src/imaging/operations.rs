//! Pixel operations applied to a loaded image.

use image::imageops::FilterType;
use image::DynamicImage;

pub const BLUR_SIGMA: f32 = 5.0;
pub const RESIZE_EDGE: u32 = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Blur,
    Resize,
    Grayscale,
}

impl Operation {
    /// Unrecognized names fall back to `Blur`.
    pub fn parse(name: &str) -> Self {
        match name {
            "blur" => Operation::Blur,
            "resize" => Operation::Resize,
            "grayscale" => Operation::Grayscale,
            other => {
                tracing::warn!("Unknown task type {}, defaulting to blur", other);
                Operation::Blur
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Operation::Blur => "blur",
            Operation::Resize => "resize",
            Operation::Grayscale => "grayscale",
        }
    }
}

/// Collapses palette, alpha and high bit-depth variants to 8-bit RGB or luma.
pub fn normalize_mode(image: DynamicImage) -> DynamicImage {
    match image {
        DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) => image,
        other if other.color().has_color() => DynamicImage::ImageRgb8(other.to_rgb8()),
        other => DynamicImage::ImageLuma8(other.to_luma8()),
    }
}

pub fn apply(operation: Operation, image: DynamicImage) -> DynamicImage {
    match operation {
        Operation::Blur => image.blur(BLUR_SIGMA),
        Operation::Resize => {
            if image.height() <= 1 {
                tracing::info!("Skipping resize of single-row image");
                image
            } else {
                image.resize_exact(RESIZE_EDGE, RESIZE_EDGE, FilterType::Triangle)
            }
        }
        Operation::Grayscale => {
            if image.color().has_color() {
                DynamicImage::ImageLuma8(image.to_luma8())
            } else {
                image
            }
        }
    }
}
