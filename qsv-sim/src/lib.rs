//! Gate application for the qsv state-vector simulator
//!
//! A gate is applied in two steps. [`GatePlan::new`] validates the gate
//! against the register (qubit range, target count, unitarity) and picks a
//! loop shape. A kernel then runs the plan over the amplitude slice:
//!
//! - [`kernels::reference::apply`] on the calling thread
//! - `kernels::parallel::apply` on a rayon thread pool (feature `parallel`)
//!
//! Both produce the same amplitudes up to floating point rounding.
//!
//! # Example
//!
//! ```
//! use qsv_core::Tolerances;
//! use qsv_gates::standard;
//! use qsv_sim::{kernels::reference, GatePlan};
//! use qsv_state::AmplitudeBuffer;
//!
//! let mut state = AmplitudeBuffer::new(2).unwrap();
//! let h = standard::hadamard(0);
//! let plan = GatePlan::new(&h, state.num_qubits(), &Tolerances::default()).unwrap();
//! reference::apply(&plan, state.amplitudes_mut()).unwrap();
//!
//! assert!((state.read(1).unwrap().re - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-12);
//! ```

pub mod kernels;

pub use kernels::{GatePlan, GroupLayout, KernelPath, MAX_KERNEL_TARGETS};
