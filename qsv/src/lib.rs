//! # qsv
//!
//! A state-vector quantum simulator.
//!
//! An n-qubit state is an [`AmplitudeBuffer`] of 2^n complex amplitudes.
//! Gates are [`GateDescriptor`]s: a unitary matrix on ordered target qubits,
//! optionally conditioned on control qubits. A [`DispatchBridge`] validates
//! each gate and applies it in place through either the sequential reference
//! kernel or the multi-threaded accelerated kernel, and runs measurements.
//!
//! # Quick Start
//!
//! ```
//! use qsv::prelude::*;
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let bridge = DispatchBridge::new(KernelConfig::default()).unwrap();
//! let mut state = bridge.create_state(2).unwrap();
//!
//! bridge.apply_gate(&mut state, &standard::hadamard(0)).unwrap();
//! bridge.apply_gate(&mut state, &standard::cnot(0, 1).unwrap()).unwrap();
//!
//! let mut rng = StdRng::seed_from_u64(1);
//! let shot = bridge.sample(&mut state, &[0, 1], true, &mut rng).unwrap();
//! assert!(shot.outcome.to_bitstring() == "00" || shot.outcome.to_bitstring() == "11");
//! ```
//!
//! # Crates
//!
//! - `qsv-core`: errors and configuration
//! - `qsv-state`: amplitude buffer and measurement engine
//! - `qsv-gates`: gate matrices, descriptors and the standard library
//! - `qsv-sim`: gate application kernels
//! - `qsv-backend`: the dispatch bridge

pub mod circuit;

pub use circuit::Circuit;

pub use qsv_backend::{BackendLoadError, BackendStatus, DispatchBridge, KernelBackend, ReferenceBackend};
#[cfg(feature = "parallel")]
pub use qsv_backend::AcceleratedBackend;
pub use qsv_core::{
    BackendPreference, ErrorKind, KernelConfig, NumericalError, QsvError, ResourceError, Result, Tolerances,
    ValidationError,
};
pub use qsv_gates::{matrices, standard, GateDescriptor, GateMatrix};
pub use qsv_sim::{GatePlan, KernelPath};
pub use qsv_state::{measurement, AmplitudeBuffer, MeasurementOutcome, NormReport, Outcome, SamplingResult};

/// Commonly used items
pub mod prelude {
    pub use crate::circuit::Circuit;
    pub use qsv_backend::{BackendStatus, DispatchBridge};
    pub use qsv_core::{KernelConfig, QsvError, Result, Tolerances};
    pub use qsv_gates::{standard, GateDescriptor, GateMatrix};
    pub use qsv_state::{AmplitudeBuffer, MeasurementOutcome, Outcome};
}
