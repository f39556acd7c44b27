//! Standard gate library
//!
//! Every function returns a [`GateDescriptor`] bound to the given qubits.
//! Fixed single-qubit gates cannot fail; anything taking an angle or more
//! than one qubit returns a `Result` so that non-finite parameters and
//! repeated qubits are caught at construction time.

use crate::descriptor::{GateDescriptor, QubitList};
use crate::matrices;
use crate::matrix::GateMatrix;
use qsv_core::ValidationError;

macro_rules! fixed_single_qubit {
    ($(#[$doc:meta])* $fn_name:ident, $label:literal, $matrix:expr) => {
        $(#[$doc])*
        #[inline]
        pub fn $fn_name(target: usize) -> GateDescriptor {
            GateDescriptor::single_qubit($label, GateMatrix::from_2x2(&$matrix), target)
        }
    };
}

fn finite_angle(theta: f64) -> Result<f64, ValidationError> {
    if theta.is_finite() {
        Ok(theta)
    } else {
        Err(ValidationError::invalid_parameter("theta", theta))
    }
}

// ============================================================================
// Single-Qubit Gates
// ============================================================================

fixed_single_qubit!(
    /// Identity
    identity, "I", matrices::IDENTITY
);
fixed_single_qubit!(
    /// Hadamard: H|0⟩ = (|0⟩ + |1⟩)/√2
    hadamard, "H", matrices::HADAMARD
);
fixed_single_qubit!(
    /// Pauli-X (bit flip)
    pauli_x, "X", matrices::PAULI_X
);
fixed_single_qubit!(
    /// Pauli-Y
    pauli_y, "Y", matrices::PAULI_Y
);
fixed_single_qubit!(
    /// Pauli-Z (phase flip)
    pauli_z, "Z", matrices::PAULI_Z
);
fixed_single_qubit!(
    /// S = √Z
    s, "S", matrices::S_GATE
);
fixed_single_qubit!(
    /// S†
    sdg, "S†", matrices::S_GATE_DAGGER
);
fixed_single_qubit!(
    /// T = √S
    t, "T", matrices::T_GATE
);
fixed_single_qubit!(
    /// T†
    tdg, "T†", matrices::T_GATE_DAGGER
);
fixed_single_qubit!(
    /// V = √X
    v, "V", matrices::SQRT_X
);
fixed_single_qubit!(
    /// V†
    vdg, "V†", matrices::SQRT_X_DAGGER
);
fixed_single_qubit!(
    /// √Y
    sqrt_y, "√Y", matrices::SQRT_Y
);
fixed_single_qubit!(
    /// √Y†
    sqrt_ydg, "√Y†", matrices::SQRT_Y_DAGGER
);

// ============================================================================
// Parameterized Single-Qubit Gates
// ============================================================================

/// Phase gate U1(θ) = diag(1, e^(iθ))
pub fn phase(target: usize, theta: f64) -> Result<GateDescriptor, ValidationError> {
    let theta = finite_angle(theta)?;
    Ok(GateDescriptor::single_qubit("P", GateMatrix::from_2x2(&matrices::phase(theta)), target))
}

/// Alias for [`phase`]
pub fn u1(target: usize, theta: f64) -> Result<GateDescriptor, ValidationError> {
    phase(target, theta)
}

/// RX(θ) = exp(-iθX/2)
pub fn rx(target: usize, theta: f64) -> Result<GateDescriptor, ValidationError> {
    let theta = finite_angle(theta)?;
    Ok(GateDescriptor::single_qubit("RX", GateMatrix::from_2x2(&matrices::rotation_x(theta)), target))
}

/// RY(θ) = exp(-iθY/2)
pub fn ry(target: usize, theta: f64) -> Result<GateDescriptor, ValidationError> {
    let theta = finite_angle(theta)?;
    Ok(GateDescriptor::single_qubit("RY", GateMatrix::from_2x2(&matrices::rotation_y(theta)), target))
}

/// RZ(θ) = exp(-iθZ/2)
pub fn rz(target: usize, theta: f64) -> Result<GateDescriptor, ValidationError> {
    let theta = finite_angle(theta)?;
    Ok(GateDescriptor::single_qubit("RZ", GateMatrix::from_2x2(&matrices::rotation_z(theta)), target))
}

// ============================================================================
// Controlled Gates
// ============================================================================

/// Attach one control qubit to an existing gate
pub fn controlled(control: usize, gate: &GateDescriptor) -> Result<GateDescriptor, ValidationError> {
    gate.controlled_by(&[control])
}

/// Attach any number of control qubits to an existing gate
pub fn multi_controlled(controls: &[usize], gate: &GateDescriptor) -> Result<GateDescriptor, ValidationError> {
    gate.controlled_by(controls)
}

/// Controlled-NOT
pub fn cnot(control: usize, target: usize) -> Result<GateDescriptor, ValidationError> {
    controlled(control, &pauli_x(target))
}

/// Controlled-Y
pub fn cy(control: usize, target: usize) -> Result<GateDescriptor, ValidationError> {
    controlled(control, &pauli_y(target))
}

/// Controlled-Z
pub fn cz(control: usize, target: usize) -> Result<GateDescriptor, ValidationError> {
    controlled(control, &pauli_z(target))
}

/// Controlled-Hadamard
pub fn ch(control: usize, target: usize) -> Result<GateDescriptor, ValidationError> {
    controlled(control, &hadamard(target))
}

/// Controlled phase
pub fn cphase(control: usize, target: usize, theta: f64) -> Result<GateDescriptor, ValidationError> {
    controlled(control, &phase(target, theta)?)
}

/// Controlled RX
pub fn crx(control: usize, target: usize, theta: f64) -> Result<GateDescriptor, ValidationError> {
    controlled(control, &rx(target, theta)?)
}

/// Controlled RY
pub fn cry(control: usize, target: usize, theta: f64) -> Result<GateDescriptor, ValidationError> {
    controlled(control, &ry(target, theta)?)
}

/// Controlled RZ
pub fn crz(control: usize, target: usize, theta: f64) -> Result<GateDescriptor, ValidationError> {
    controlled(control, &rz(target, theta)?)
}

/// Toffoli (CCX)
pub fn toffoli(control1: usize, control2: usize, target: usize) -> Result<GateDescriptor, ValidationError> {
    multi_controlled(&[control1, control2], &pauli_x(target))
}

/// Multi-controlled X
///
/// With an empty control list this is a plain X.
pub fn mcx(controls: &[usize], target: usize) -> Result<GateDescriptor, ValidationError> {
    multi_controlled(controls, &pauli_x(target))
}

// ============================================================================
// Two-Qubit Gates
// ============================================================================

/// SWAP
pub fn swap(qubit1: usize, qubit2: usize) -> Result<GateDescriptor, ValidationError> {
    GateDescriptor::new("SWAP", GateMatrix::from_4x4(&matrices::SWAP), &[qubit1, qubit2], &[])
}

/// Controlled SWAP (Fredkin)
pub fn cswap(control: usize, qubit1: usize, qubit2: usize) -> Result<GateDescriptor, ValidationError> {
    controlled(control, &swap(qubit1, qubit2)?)
}

/// Arbitrary matrix on arbitrary targets, optionally controlled
///
/// Unitarity is not checked here; the kernel validates it against the
/// configured tolerance before touching any state.
pub fn unitary(matrix: GateMatrix, targets: &[usize], controls: &[usize]) -> Result<GateDescriptor, ValidationError> {
    GateDescriptor::custom(matrix, targets, controls)
}

/// Qubit list helper for callers building control sets incrementally
pub fn qubits(indices: impl IntoIterator<Item = usize>) -> QubitList {
    indices.into_iter().collect()
}
