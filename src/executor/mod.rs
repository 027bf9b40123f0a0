//! Task Executor Module
//!
//! The background execution side of the system: a queue of per-file units of
//! work, a worker pool that runs them, and the client the job core uses to
//! submit work and read its state.
//!
//! ## Architecture Overview
//! 1. **Submission**: `ExecutorClient::submit` enqueues a `Task` and returns its `TaskId` at once.
//! 2. **Execution**: Workers claim `Pending` tasks in submission order and run the registered handler.
//! 3. **Progress**: Handlers push checkpoints through a channel; the pool records them on the queue.
//! 4. **Polling**: `ExecutorClient::poll` maps the executor's raw state to a `TaskSnapshot`.
//!
//! ## Submodules
//! - **`queue`**: Task state store with atomic claiming.
//! - **`executor`**: The worker pool (claim -> run -> complete).
//! - **`registry`**: Maps string identifiers (e.g., "process_image") to executable Rust code.
//! - **`client`**: Local and remote `ExecutorClient` implementations.
//! - **`protocol`** / **`handlers`**: The HTTP surface of a worker node.

pub mod client;
pub mod executor;
pub mod handlers;
pub mod protocol;
pub mod queue;
pub mod registry;
pub mod types;
