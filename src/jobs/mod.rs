//! Jobs Module
//!
//! The orchestration core: a job is one multi-file upload, fanned out into
//! one executor task per file and read back as a single aggregated status.
//!
//! ## Submodules
//! - **`types`**: Job records, receipts and status views.
//! - **`registry`**: Concurrent in-memory job store with per-key atomic updates.
//! - **`aggregator`**: Precedence rules folding task states into a job state.
//! - **`orchestrator`**: `create_job` / `get_job_status` with owner isolation.
//! - **`protocol`** / **`handlers`**: The client-facing HTTP surface.

pub mod aggregator;
pub mod handlers;
pub mod orchestrator;
pub mod protocol;
pub mod registry;
pub mod types;
