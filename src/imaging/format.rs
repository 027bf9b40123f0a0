//! Input format resolution.
//!
//! The kind of an input is decided once, from its file name, before any
//! processing starts. Output paths are derived from the same resolution.

use std::path::{Path, PathBuf};

/// Suffixes made of more than one extension.
const COMPOUND_SUFFIXES: &[&str] = &[".nii.gz"];
const VOLUME_SUFFIXES: &[&str] = &[".nii", ".nii.gz"];
const SLICE_SUFFIXES: &[&str] = &[".dcm", ".dicom"];

pub const PROCESSED_MARKER: &str = "_processed";
/// Extension of every pixel-processed output.
pub const RASTER_EXTENSION: &str = "png";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatKind {
    /// Plain raster image (PNG, JPEG, ...).
    Standard,
    /// DICOM: decoded to a single representative 2D slice.
    SliceVolume,
    /// NIfTI: passed through untouched.
    VolumeContainer,
}

impl FormatKind {
    /// `suffix` is matched case-insensitively and includes the leading dot.
    pub fn from_suffix(suffix: &str) -> Self {
        let suffix = suffix.to_ascii_lowercase();

        if VOLUME_SUFFIXES.contains(&suffix.as_str()) {
            FormatKind::VolumeContainer
        } else if SLICE_SUFFIXES.contains(&suffix.as_str()) {
            FormatKind::SliceVolume
        } else {
            FormatKind::Standard
        }
    }
}

/// Splits a file name into stem and suffix, recognizing compound suffixes.
///
/// The suffix keeps its original case. A leading dot alone is not a suffix.
pub fn split_suffix(file_name: &str) -> (&str, &str) {
    let lower = file_name.to_ascii_lowercase();

    for compound in COMPOUND_SUFFIXES {
        if lower.len() > compound.len() && lower.ends_with(compound) {
            let cut = file_name.len() - compound.len();
            return (&file_name[..cut], &file_name[cut..]);
        }
    }

    match file_name.rfind('.') {
        Some(idx) if idx > 0 => (&file_name[..idx], &file_name[idx..]),
        _ => (file_name, ""),
    }
}

/// One task input, resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    pub path: PathBuf,
    pub stem: String,
    pub suffix: String,
    pub kind: FormatKind,
}

impl InputFile {
    pub fn resolve(path: &Path) -> Self {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let (stem, suffix) = split_suffix(&file_name);

        Self {
            path: path.to_path_buf(),
            stem: stem.to_string(),
            suffix: suffix.to_string(),
            kind: FormatKind::from_suffix(suffix),
        }
    }

    /// Where the processed artifact goes, next to the input.
    ///
    /// Pass-through volumes keep their suffix; everything else becomes PNG.
    pub fn output_path(&self) -> PathBuf {
        let parent = self.path.parent().unwrap_or_else(|| Path::new(""));

        let file_name = match self.kind {
            FormatKind::VolumeContainer => {
                format!("{}{}{}", self.stem, PROCESSED_MARKER, self.suffix)
            }
            FormatKind::Standard | FormatKind::SliceVolume => {
                format!("{}{}.{}", self.stem, PROCESSED_MARKER, RASTER_EXTENSION)
            }
        };

        parent.join(file_name)
    }
}
