//! Quantum gate library for qsv
//!
//! This crate describes *what* a gate is; applying it is the kernel's job.
//!
//! - [`GateMatrix`]: a dense k x k complex matrix (k = 2^targets) with
//!   unitarity checks and adjoints
//! - [`GateDescriptor`]: an immutable matrix plus ordered target qubits and
//!   optional control qubits
//! - [`standard`]: factory functions for the usual gates
//! - [`matrices`]: pre-computed constant matrices
//!
//! # Matrix ordering
//!
//! Row and column index *j* of a gate matrix encodes the target qubits with
//! bit *b* of *j* holding the value of `targets[b]`. The first target is the
//! least significant.
//!
//! # Example
//!
//! ```
//! use qsv_gates::standard;
//! use std::f64::consts::PI;
//!
//! let h = standard::hadamard(0);
//! let cx = standard::cnot(0, 1).unwrap();
//! let rz = standard::rz(2, PI / 4.0).unwrap();
//!
//! assert_eq!(h.targets(), &[0]);
//! assert_eq!(cx.controls(), &[0]);
//! assert!(rz.matrix().is_unitary(1e-12));
//! ```

pub mod descriptor;
pub mod matrices;
pub mod matrix;
pub mod standard;

pub use descriptor::{GateDescriptor, QubitList};
pub use matrix::{GateMatrix, MAX_MATRIX_QUBITS};
