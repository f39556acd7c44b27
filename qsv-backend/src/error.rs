//! Backend load errors

use thiserror::Error;

/// Reasons the accelerated backend could not be brought up
///
/// These never reach an operation's caller. The dispatch bridge logs them,
/// falls back to the reference backend and keeps the error for inspection.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendLoadError {
    /// The crate was built without the `parallel` feature
    #[error("Accelerated backend not compiled in (enable the `parallel` feature)")]
    NotCompiled,

    /// The worker pool could not be created
    #[error("Failed to build worker pool: {reason}")]
    ThreadPool { reason: String },
}
