//! Storage Module
//!
//! File storage for uploads and processed artifacts. Job metadata is not kept
//! here; it lives in the in-memory `jobs::registry`.
//!
//! ## Submodules
//! - **`uploads`**: Per-owner, per-job directories on the local file system.

pub mod uploads;

#[cfg(test)]
mod tests;
