//! Error types for qsv
//!
//! Three failure classes exist. Validation failures are local precondition
//! violations and never touch the state. Resource failures come from buffer
//! allocation. Numerical failures report probability or norm drift that the
//! simulator refuses to hide.

use thiserror::Error;

/// Result type for qsv operations
pub type Result<T> = std::result::Result<T, QsvError>;

/// Malformed gate descriptor, qubit subset or parameter
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Qubit index outside `[0, num_qubits)`
    #[error("Qubit index {qubit} out of range for {num_qubits}-qubit state")]
    QubitOutOfRange { qubit: usize, num_qubits: usize },

    /// Same qubit listed twice within targets, controls or a measured subset
    #[error("Duplicate qubit {qubit} in operation")]
    DuplicateQubit { qubit: usize },

    /// Qubit appears both as a target and as a control
    #[error("Qubit {qubit} is both a target and a control")]
    OverlappingControl { qubit: usize },

    /// Gate must act on at least one target qubit
    #[error("Gate has no target qubits")]
    NoTargets,

    /// Matrix dimension does not match 2^(number of targets)
    #[error("Matrix dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Matrix data length is not `dim * dim` or `dim` is not a power of two
    #[error("Malformed matrix: {reason}")]
    MalformedMatrix { reason: String },

    /// `M * M^dagger` deviates from identity beyond tolerance
    #[error("Matrix not unitary: deviation {deviation:.3e} exceeds tolerance {tolerance:.3e}")]
    NotUnitary { deviation: f64, tolerance: f64 },

    /// Gate acts on more targets than the kernel supports
    #[error("Gate acts on {targets} targets, kernel supports at most {max}")]
    TooManyTargets { targets: usize, max: usize },

    /// Outcome value does not fit in the measured subset
    #[error("Outcome {outcome:#b} does not fit in {width} measured qubits")]
    OutcomeOutOfRange { outcome: u64, width: usize },

    /// Invalid parameter value (rotation angle, tolerance, worker hint...)
    #[error("Invalid parameter {name} = {value}")]
    InvalidParameter { name: &'static str, value: String },
}

impl ValidationError {
    /// Create a qubit out of range error
    pub fn qubit_out_of_range(qubit: usize, num_qubits: usize) -> Self {
        Self::QubitOutOfRange { qubit, num_qubits }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter(name: &'static str, value: impl ToString) -> Self {
        Self::InvalidParameter {
            name,
            value: value.to_string(),
        }
    }
}

/// Allocation failure for an amplitude buffer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResourceError {
    /// Requested qubit count exceeds the configured cap
    #[error("Cannot allocate {requested}-qubit state: limit is {max} qubits")]
    TooManyQubits { requested: usize, max: usize },

    /// The allocator refused the request
    #[error("Failed to allocate {bytes} bytes for state vector")]
    AllocationFailed { bytes: usize },
}

/// Probability or norm drift beyond tolerance
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NumericalError {
    /// Collapse onto an outcome whose probability is effectively zero
    #[error("Degenerate collapse: outcome probability {probability:.3e} below tolerance {tolerance:.3e}")]
    DegenerateOutcome { probability: f64, tolerance: f64 },

    /// Total probability drifted away from 1
    #[error("Norm drift: total probability {norm:.12} deviates from 1 by more than {tolerance:.3e}")]
    NormDrift { norm: f64, tolerance: f64 },
}

/// Top-level error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QsvError {
    /// Validation failure, state untouched
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Allocation failure
    #[error("Resource error: {0}")]
    Resource(#[from] ResourceError),

    /// Numerical drift or degenerate probability
    #[error("Numerical error: {0}")]
    Numerical(#[from] NumericalError),
}

/// Error class, for callers that branch on the failure category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    Resource,
    Numerical,
}

impl QsvError {
    /// Get the error class
    pub fn kind(&self) -> ErrorKind {
        match self {
            QsvError::Validation(_) => ErrorKind::Validation,
            QsvError::Resource(_) => ErrorKind::Resource,
            QsvError::Numerical(_) => ErrorKind::Numerical,
        }
    }

    /// Whether retrying with different inputs can succeed
    ///
    /// Resource failures can be retried with a smaller qubit count; the other
    /// classes point at a bug in the circuit or its parameters.
    pub fn is_retryable(&self) -> bool {
        matches!(self, QsvError::Resource(_))
    }
}
