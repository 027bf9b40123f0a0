//! Image Processing Module
//!
//! The body of the per-file task. Given an input path and an operation name it
//! resolves the input's format once, then either copies a NIfTI volume
//! verbatim, or decodes (DICOM slice or raster), filters and writes a PNG.
//!
//! ## Submodules
//! - **`format`**: Suffix resolution, `FormatKind` dispatch and output paths.
//! - **`slice`**: DICOM decoding to a normalized 8-bit slice.
//! - **`operations`**: Blur / resize / grayscale on a loaded image.
//! - **`task`**: The executor-facing `process_image` handler.

pub mod format;
pub mod operations;
pub mod slice;
pub mod task;

#[cfg(test)]
mod tests;
