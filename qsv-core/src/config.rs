//! Simulator configuration
//!
//! All knobs are passed explicitly when a buffer or dispatch bridge is
//! constructed. Nothing here reads environment variables or global state.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};

/// Numerical tolerances
///
/// The defaults are conservative starting points for double precision, not
/// physically derived values. Tighten or loosen them per workload.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerances {
    /// Maximum absolute entry of `M * M^dagger - I` accepted as unitary
    ///
    /// Default: 1e-8
    pub unitarity: f64,

    /// Maximum deviation of the total probability from 1
    ///
    /// Default: 1e-8
    pub norm_drift: f64,

    /// Probability below which a collapse is considered degenerate
    ///
    /// Default: 1e-12
    pub probability: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            unitarity: 1e-8,
            norm_drift: 1e-8,
            probability: 1e-12,
        }
    }
}

impl Tolerances {
    /// Create tolerances with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the unitarity tolerance
    pub fn with_unitarity(mut self, tolerance: f64) -> Self {
        self.unitarity = tolerance;
        self
    }

    /// Set the norm drift tolerance
    pub fn with_norm_drift(mut self, tolerance: f64) -> Self {
        self.norm_drift = tolerance;
        self
    }

    /// Set the degenerate probability threshold
    pub fn with_probability(mut self, tolerance: f64) -> Self {
        self.probability = tolerance;
        self
    }

    /// Check that every tolerance is finite and non-negative
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (name, value) in [
            ("unitarity", self.unitarity),
            ("norm_drift", self.norm_drift),
            ("probability", self.probability),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ValidationError::invalid_parameter(name, value));
            }
        }
        Ok(())
    }
}

/// Which kernel backend the dispatch bridge should try to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BackendPreference {
    /// Try the accelerated backend, fall back to the reference one
    #[default]
    Auto,
    /// Always use the reference backend
    ReferenceOnly,
}

/// Configuration for the gate application kernel and dispatch bridge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KernelConfig {
    /// Numerical tolerances
    pub tolerances: Tolerances,

    /// Worker thread hint for the accelerated backend
    ///
    /// `None` lets the thread pool size itself to the available cores.
    ///
    /// Default: None
    pub worker_threads: Option<usize>,

    /// Minimum number of qubits before a gate is split across workers
    ///
    /// Smaller states run on the calling thread to avoid synchronization
    /// overhead.
    ///
    /// Default: 12
    pub parallel_threshold: usize,

    /// Largest state the bridge will allocate
    ///
    /// Default: 30 (16 GiB of amplitudes)
    pub max_qubits: usize,

    /// Backend selection policy
    ///
    /// Default: Auto
    pub backend: BackendPreference,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            tolerances: Tolerances::default(),
            worker_threads: None,
            parallel_threshold: 12,
            max_qubits: 30,
            backend: BackendPreference::Auto,
        }
    }
}

impl KernelConfig {
    /// Create a new configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration that never leaves the calling thread
    pub fn reference() -> Self {
        Self {
            backend: BackendPreference::ReferenceOnly,
            ..Default::default()
        }
    }

    /// Configuration that parallelizes every gate regardless of state size
    ///
    /// Mostly useful for exercising the parallel paths on small states.
    pub fn always_parallel() -> Self {
        Self {
            parallel_threshold: 0,
            ..Default::default()
        }
    }

    /// Set the tolerances
    pub fn with_tolerances(mut self, tolerances: Tolerances) -> Self {
        self.tolerances = tolerances;
        self
    }

    /// Set the worker thread hint
    pub fn with_worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = Some(threads);
        self
    }

    /// Set the parallel threshold (in qubits)
    pub fn with_parallel_threshold(mut self, qubits: usize) -> Self {
        self.parallel_threshold = qubits;
        self
    }

    /// Set the maximum qubit count
    pub fn with_max_qubits(mut self, max_qubits: usize) -> Self {
        self.max_qubits = max_qubits;
        self
    }

    /// Set the backend preference
    pub fn with_backend(mut self, backend: BackendPreference) -> Self {
        self.backend = backend;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.tolerances.validate()?;
        if self.worker_threads == Some(0) {
            return Err(ValidationError::invalid_parameter("worker_threads", 0));
        }
        // One amplitude index must fit in a u64 outcome and a usize offset.
        if self.max_qubits >= usize::BITS as usize - 4 {
            return Err(ValidationError::invalid_parameter(
                "max_qubits",
                self.max_qubits,
            ));
        }
        Ok(())
    }
}
