//! Quantum state storage and measurement
//!
//! This crate owns the raw amplitude array of an n-qubit register and the
//! measurement engine that reads probabilities out of it.
//!
//! # Layout
//!
//! Amplitudes are stored contiguously and indexed by an n-bit integer whose
//! bit *i* is the value of qubit *i*. For two qubits the order is
//! `|q1 q0⟩ = 00, 01, 10, 11`.
//!
//! # Example
//!
//! ```
//! use qsv_state::{measurement, AmplitudeBuffer};
//!
//! let state = AmplitudeBuffer::new(2).unwrap();
//! assert_eq!(state.dimension(), 4);
//!
//! let probs: Vec<_> = measurement::probabilities(&state, &[0, 1]).unwrap().collect();
//! assert_eq!(probs[0].1, 1.0);
//! ```

pub mod amplitude_buffer;
pub mod bits;
pub mod measurement;
pub mod validation;

pub use amplitude_buffer::{AmplitudeBuffer, DEFAULT_MAX_QUBITS};
pub use measurement::{MeasurementOutcome, Outcome, Probabilities, SamplingResult};
pub use validation::NormReport;
