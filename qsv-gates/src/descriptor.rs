//! Gate descriptors: a matrix bound to concrete qubits

use crate::matrix::GateMatrix;
use qsv_core::ValidationError;
use smallvec::SmallVec;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// Inline list of qubit indices
pub type QubitList = SmallVec<[usize; 4]>;

/// Immutable gate operation
///
/// Holds a 2^k x 2^k matrix, the k ordered target qubits it acts on, and the
/// control qubits that must all read 1 for the matrix to be applied.
///
/// Construction checks everything that does not depend on the state:
/// targets are non-empty, the matrix dimension matches, and no qubit is
/// listed twice. [`GateDescriptor::validate`] adds the range and unitarity
/// checks against a concrete register.
#[derive(Debug, Clone, PartialEq)]
pub struct GateDescriptor {
    name: Cow<'static, str>,
    matrix: Arc<GateMatrix>,
    targets: QubitList,
    controls: QubitList,
}

impl GateDescriptor {
    /// Create a descriptor
    ///
    /// # Errors
    /// - [`ValidationError::NoTargets`] for an empty target list
    /// - [`ValidationError::DimensionMismatch`] if the matrix is not
    ///   2^targets wide
    /// - [`ValidationError::DuplicateQubit`] /
    ///   [`ValidationError::OverlappingControl`] for repeated qubits
    pub fn new(
        name: impl Into<Cow<'static, str>>,
        matrix: GateMatrix,
        targets: &[usize],
        controls: &[usize],
    ) -> Result<Self, ValidationError> {
        Self::from_shared(name, Arc::new(matrix), targets, controls)
    }

    /// Create an unnamed descriptor for a user-supplied matrix
    pub fn custom(matrix: GateMatrix, targets: &[usize], controls: &[usize]) -> Result<Self, ValidationError> {
        Self::new("U", matrix, targets, controls)
    }

    fn from_shared(
        name: impl Into<Cow<'static, str>>,
        matrix: Arc<GateMatrix>,
        targets: &[usize],
        controls: &[usize],
    ) -> Result<Self, ValidationError> {
        if targets.is_empty() {
            return Err(ValidationError::NoTargets);
        }

        let expected = 1usize
            .checked_shl(targets.len() as u32)
            .ok_or(ValidationError::TooManyTargets {
                targets: targets.len(),
                max: usize::BITS as usize - 1,
            })?;
        if matrix.dim() != expected {
            return Err(ValidationError::DimensionMismatch {
                expected,
                actual: matrix.dim(),
            });
        }

        for (i, &q) in targets.iter().enumerate() {
            if targets[..i].contains(&q) {
                return Err(ValidationError::DuplicateQubit { qubit: q });
            }
        }
        for (i, &q) in controls.iter().enumerate() {
            if controls[..i].contains(&q) {
                return Err(ValidationError::DuplicateQubit { qubit: q });
            }
            if targets.contains(&q) {
                return Err(ValidationError::OverlappingControl { qubit: q });
            }
        }

        Ok(Self {
            name: name.into(),
            matrix,
            targets: targets.iter().copied().collect(),
            controls: controls.iter().copied().collect(),
        })
    }

    /// Uncontrolled single-qubit gate; cannot fail structurally
    pub(crate) fn single_qubit(name: &'static str, matrix: GateMatrix, target: usize) -> Self {
        debug_assert_eq!(matrix.dim(), 2);
        Self {
            name: Cow::Borrowed(name),
            matrix: Arc::new(matrix),
            targets: smallvec::smallvec![target],
            controls: QubitList::new(),
        }
    }

    /// Gate name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Gate matrix
    pub fn matrix(&self) -> &GateMatrix {
        &self.matrix
    }

    /// Ordered target qubits
    pub fn targets(&self) -> &[usize] {
        &self.targets
    }

    /// Control qubits
    pub fn controls(&self) -> &[usize] {
        &self.controls
    }

    /// Number of target qubits
    pub fn num_targets(&self) -> usize {
        self.targets.len()
    }

    /// Highest qubit index touched, plus one
    pub fn min_register_size(&self) -> usize {
        self.targets
            .iter()
            .chain(&self.controls)
            .max()
            .map_or(0, |&q| q + 1)
    }

    /// Check the descriptor against an n-qubit register
    ///
    /// # Errors
    /// - [`ValidationError::QubitOutOfRange`] if any qubit is `>= num_qubits`
    /// - [`ValidationError::NotUnitary`] if `M * M^dagger` deviates from the
    ///   identity by more than `unitarity_tolerance`
    pub fn validate(&self, num_qubits: usize, unitarity_tolerance: f64) -> Result<(), ValidationError> {
        if let Some(&q) = self.targets.iter().chain(&self.controls).find(|&&q| q >= num_qubits) {
            return Err(ValidationError::qubit_out_of_range(q, num_qubits));
        }

        let deviation = self.matrix.unitarity_deviation();
        if !(deviation <= unitarity_tolerance) {
            return Err(ValidationError::NotUnitary {
                deviation,
                tolerance: unitarity_tolerance,
            });
        }
        Ok(())
    }

    /// Inverse gate: conjugate-transposed matrix on the same qubits
    pub fn adjoint(&self) -> Self {
        let name = match self.name.strip_suffix('†') {
            Some(base) => Cow::Owned(base.to_string()),
            None => Cow::Owned(format!("{}†", self.name)),
        };
        Self {
            name,
            matrix: Arc::new(self.matrix.adjoint()),
            targets: self.targets.clone(),
            controls: self.controls.clone(),
        }
    }

    /// Add control qubits
    pub fn controlled_by(&self, extra: &[usize]) -> Result<Self, ValidationError> {
        let controls: QubitList = self.controls.iter().chain(extra).copied().collect();
        let name = format!("{}{}", "C".repeat(extra.len()), self.name);
        Self::from_shared(name, Arc::clone(&self.matrix), &self.targets, &controls)
    }

    /// Rebind the gate to shifted qubit indices
    pub fn offset(&self, by: usize) -> Self {
        Self {
            name: self.name.clone(),
            matrix: Arc::clone(&self.matrix),
            targets: self.targets.iter().map(|q| q + by).collect(),
            controls: self.controls.iter().map(|q| q + by).collect(),
        }
    }
}

impl fmt::Display for GateDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.controls.is_empty() {
            write!(f, " ctl{:?}", self.controls.as_slice())?;
        }
        write!(f, " tgt{:?}", self.targets.as_slice())
    }
}
