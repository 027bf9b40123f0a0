//! Radiology Job Service Library
//!
//! This library crate defines the modules behind the service binary (`main.rs`).
//! Uploaded medical images become jobs; each file of a job becomes one task
//! run by the executor; clients poll an aggregated job status.
//!
//! ## Architecture Modules
//! - **`executor`**: The task processing engine. A bounded in-memory queue, a
//!   worker pool and the `ExecutorClient` seam (local or remote over HTTP).
//! - **`imaging`**: The task body. Resolves the input format once, then
//!   decodes, filters and saves (or copies volumes verbatim).
//! - **`jobs`**: The orchestration core. Job registry, status aggregation,
//!   per-owner isolation and the client-facing HTTP handlers.
//! - **`storage`**: Per-owner, per-job upload directories.
//! - **`config`** / **`server`**: CLI configuration and router assembly.
//! - **`error`**: Typed errors shared by all of the above.

pub mod config;
pub mod error;
pub mod executor;
pub mod imaging;
pub mod jobs;
pub mod server;
pub mod storage;
