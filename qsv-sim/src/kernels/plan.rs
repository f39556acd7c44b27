//! Validated gate plans
//!
//! A [`GatePlan`] is the only way into a kernel. Building one runs every
//! check that could reject the gate, so once a plan exists, applying it
//! cannot fail half way through and leave the state partially updated.

use super::layout::GroupLayout;
use num_complex::Complex64;
use qsv_core::{Tolerances, ValidationError};
use qsv_gates::GateDescriptor;

/// Largest number of target qubits a single gate may act on
///
/// The gate matrix has 4^k entries; k = 10 is already 16 MiB.
pub const MAX_KERNEL_TARGETS: usize = 10;

/// Which loop a kernel should run for a gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelPath {
    /// Matrix is exactly diagonal: scale amplitudes in place
    Diagonal,
    /// One target qubit: 2x2 butterfly over amplitude pairs
    SingleQubit,
    /// General gather / multiply / scatter over groups of 2^k
    Dense,
}

/// A gate checked against a register size and tolerances
#[derive(Debug, Clone)]
pub struct GatePlan<'g> {
    gate: &'g GateDescriptor,
    layout: GroupLayout,
    path: KernelPath,
    diagonal: Option<Vec<Complex64>>,
}

impl<'g> GatePlan<'g> {
    /// Validate `gate` for an n-qubit register
    ///
    /// # Errors
    /// - [`ValidationError::TooManyTargets`] above [`MAX_KERNEL_TARGETS`]
    /// - [`ValidationError::QubitOutOfRange`] for any qubit `>= num_qubits`
    /// - [`ValidationError::NotUnitary`] if the matrix fails the unitarity
    ///   tolerance
    pub fn new(gate: &'g GateDescriptor, num_qubits: usize, tolerances: &Tolerances) -> Result<Self, ValidationError> {
        if gate.num_targets() > MAX_KERNEL_TARGETS {
            return Err(ValidationError::TooManyTargets {
                targets: gate.num_targets(),
                max: MAX_KERNEL_TARGETS,
            });
        }
        gate.validate(num_qubits, tolerances.unitarity)?;

        let matrix = gate.matrix();
        let (path, diagonal) = if matrix.is_diagonal(0.0) {
            (KernelPath::Diagonal, Some(matrix.diagonal()))
        } else if gate.num_targets() == 1 {
            (KernelPath::SingleQubit, None)
        } else {
            (KernelPath::Dense, None)
        };

        Ok(Self {
            gate,
            layout: GroupLayout::new(num_qubits, gate.targets(), gate.controls()),
            path,
            diagonal,
        })
    }

    /// The validated gate
    #[inline]
    pub fn gate(&self) -> &GateDescriptor {
        self.gate
    }

    /// Group enumeration
    #[inline]
    pub fn layout(&self) -> &GroupLayout {
        &self.layout
    }

    /// Preferred loop shape
    #[inline]
    pub fn path(&self) -> KernelPath {
        self.path
    }

    /// Diagonal entries, for [`KernelPath::Diagonal`] plans
    #[inline]
    pub fn diagonal(&self) -> Option<&[Complex64]> {
        self.diagonal.as_deref()
    }

    /// Register size the plan was validated for
    #[inline]
    pub fn num_qubits(&self) -> usize {
        self.layout.num_qubits()
    }

    /// Reject an amplitude slice of the wrong length
    pub fn check_dimension(&self, amplitudes: &[Complex64]) -> Result<(), ValidationError> {
        let expected = self.layout.dimension();
        if amplitudes.len() != expected {
            return Err(ValidationError::DimensionMismatch {
                expected,
                actual: amplitudes.len(),
            });
        }
        Ok(())
    }
}
