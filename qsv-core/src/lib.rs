//! Core types shared by every qsv crate
//!
//! This crate holds the pieces that all other layers agree on:
//!
//! - **Error taxonomy**: [`ValidationError`], [`ResourceError`] and
//!   [`NumericalError`], wrapped by [`QsvError`] for `?` propagation
//! - **Configuration**: [`Tolerances`] and [`KernelConfig`], passed explicitly
//!   at construction time and never read from the environment
//!
//! # Example
//!
//! ```
//! use qsv_core::{KernelConfig, Tolerances};
//!
//! let config = KernelConfig::default()
//!     .with_tolerances(Tolerances::default().with_unitarity(1e-10))
//!     .with_worker_threads(4);
//! assert!(config.validate().is_ok());
//! ```

pub mod config;
pub mod error;

pub use config::{BackendPreference, KernelConfig, Tolerances};
pub use error::{ErrorKind, NumericalError, QsvError, ResourceError, Result, ValidationError};
