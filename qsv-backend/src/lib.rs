//! Dispatch bridge for the qsv simulator
//!
//! Two interchangeable kernels sit behind the [`KernelBackend`] trait:
//!
//! - [`ReferenceBackend`]: sequential, always available
//! - `AcceleratedBackend`: rayon thread pool with diagonal and single-qubit
//!   fast paths, compiled in with the `parallel` feature (on by default)
//!
//! [`DispatchBridge`] picks one at construction time. If the accelerated
//! backend cannot be loaded, the bridge falls back to the reference backend
//! for its whole lifetime, logs the reason at `warn`, and reports
//! [`BackendStatus::Reference`] from [`DispatchBridge::backend_status`].
//! Both backends produce the same amplitudes within tolerance.

pub mod backend;
pub mod bridge;
pub mod error;
pub mod reference;

#[cfg(feature = "parallel")]
pub mod accelerated;

pub use backend::{BackendStatus, KernelBackend};
pub use bridge::DispatchBridge;
pub use error::BackendLoadError;
pub use reference::ReferenceBackend;

#[cfg(feature = "parallel")]
pub use accelerated::AcceleratedBackend;
