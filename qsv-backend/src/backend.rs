//! Kernel backend trait and status

use num_complex::Complex64;
use qsv_core::ValidationError;
use qsv_sim::GatePlan;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A gate application kernel the dispatch bridge can route to
///
/// Implementations must agree with [`ReferenceBackend`](crate::ReferenceBackend)
/// within tolerance for every plan and state.
pub trait KernelBackend: Send + Sync + fmt::Debug {
    /// Backend name, for logs
    fn name(&self) -> &str;

    /// Which class of backend this is
    fn status(&self) -> BackendStatus;

    /// Apply a validated gate in place
    ///
    /// Fails only if `amplitudes` does not match the plan's register size,
    /// in which case nothing is written.
    fn apply(&self, plan: &GatePlan<'_>, amplitudes: &mut [Complex64]) -> Result<(), ValidationError>;

    /// Marginal distribution over an already validated qubit subset
    fn marginal_distribution(&self, amplitudes: &[Complex64], qubits: &[usize]) -> Vec<f64> {
        qsv_state::measurement::marginal_distribution(amplitudes, qubits)
    }
}

/// Which dispatch path is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendStatus {
    /// Multi-threaded kernels
    Accelerated,
    /// Sequential reference kernel
    Reference,
}

impl fmt::Display for BackendStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendStatus::Accelerated => write!(f, "accelerated"),
            BackendStatus::Reference => write!(f, "reference"),
        }
    }
}
