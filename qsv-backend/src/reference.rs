//! Sequential reference backend

use crate::backend::{BackendStatus, KernelBackend};
use num_complex::Complex64;
use qsv_core::ValidationError;
use qsv_sim::kernels::reference;
use qsv_sim::GatePlan;

/// Always-available backend running every gate on the calling thread
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceBackend;

impl ReferenceBackend {
    /// Create the reference backend; it holds no state
    pub fn new() -> Self {
        Self
    }
}

impl KernelBackend for ReferenceBackend {
    fn name(&self) -> &str {
        "reference"
    }

    fn status(&self) -> BackendStatus {
        BackendStatus::Reference
    }

    fn apply(&self, plan: &GatePlan<'_>, amplitudes: &mut [Complex64]) -> Result<(), ValidationError> {
        reference::apply(plan, amplitudes)
    }
}
