//! Gate application kernels
//!
//! - [`layout`]: group enumeration shared by every kernel
//! - [`plan`]: validation up front, so application never fails midway
//! - [`reference`]: the sequential kernel everything is checked against
//! - [`parallel`]: rayon kernels with diagonal and single-qubit fast paths

pub mod layout;
pub mod plan;
pub mod reference;

#[cfg(feature = "parallel")]
pub mod parallel;

pub use layout::GroupLayout;
pub use plan::{GatePlan, KernelPath, MAX_KERNEL_TARGETS};
