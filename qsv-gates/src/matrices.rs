//! Pre-computed gate matrices
//!
//! Fixed gates are compile-time constants; parameterized gates are computed
//! by the functions at the bottom of this module.

use num_complex::Complex64;

/// 2x2 complex matrix in row-major order
pub type Matrix2x2 = [[Complex64; 2]; 2];

/// 4x4 complex matrix in row-major order
pub type Matrix4x4 = [[Complex64; 4]; 4];

const ZERO: Complex64 = Complex64::new(0.0, 0.0);
const ONE: Complex64 = Complex64::new(1.0, 0.0);
const I: Complex64 = Complex64::new(0.0, 1.0);
const NEG_I: Complex64 = Complex64::new(0.0, -1.0);
const NEG_ONE: Complex64 = Complex64::new(-1.0, 0.0);

const INV_SQRT2: f64 = std::f64::consts::FRAC_1_SQRT_2;

// Single-qubit gates

/// Identity
pub const IDENTITY: Matrix2x2 = [[ONE, ZERO], [ZERO, ONE]];

/// Hadamard
/// H = 1/√2 * [[1,  1],
///             [1, -1]]
pub const HADAMARD: Matrix2x2 = [
    [Complex64::new(INV_SQRT2, 0.0), Complex64::new(INV_SQRT2, 0.0)],
    [Complex64::new(INV_SQRT2, 0.0), Complex64::new(-INV_SQRT2, 0.0)],
];

/// Pauli-X (NOT)
pub const PAULI_X: Matrix2x2 = [[ZERO, ONE], [ONE, ZERO]];

/// Pauli-Y
/// Y = [[0, -i],
///      [i,  0]]
pub const PAULI_Y: Matrix2x2 = [[ZERO, NEG_I], [I, ZERO]];

/// Pauli-Z
pub const PAULI_Z: Matrix2x2 = [[ONE, ZERO], [ZERO, NEG_ONE]];

/// S = √Z
pub const S_GATE: Matrix2x2 = [[ONE, ZERO], [ZERO, I]];

/// S†
pub const S_GATE_DAGGER: Matrix2x2 = [[ONE, ZERO], [ZERO, NEG_I]];

/// T = √S
/// T = [[1, 0],
///      [0, e^(iπ/4)]]
pub const T_GATE: Matrix2x2 = [[ONE, ZERO], [ZERO, Complex64::new(INV_SQRT2, INV_SQRT2)]];

/// T†
pub const T_GATE_DAGGER: Matrix2x2 = [[ONE, ZERO], [ZERO, Complex64::new(INV_SQRT2, -INV_SQRT2)]];

/// V = √X
/// V = 1/2 * [[1+i, 1-i],
///            [1-i, 1+i]]
pub const SQRT_X: Matrix2x2 = [
    [Complex64::new(0.5, 0.5), Complex64::new(0.5, -0.5)],
    [Complex64::new(0.5, -0.5), Complex64::new(0.5, 0.5)],
];

/// V†
pub const SQRT_X_DAGGER: Matrix2x2 = [
    [Complex64::new(0.5, -0.5), Complex64::new(0.5, 0.5)],
    [Complex64::new(0.5, 0.5), Complex64::new(0.5, -0.5)],
];

/// √Y
/// √Y = 1/2 * [[1+i, -1-i],
///             [1+i,  1+i]]
pub const SQRT_Y: Matrix2x2 = [
    [Complex64::new(0.5, 0.5), Complex64::new(-0.5, -0.5)],
    [Complex64::new(0.5, 0.5), Complex64::new(0.5, 0.5)],
];

/// √Y†
pub const SQRT_Y_DAGGER: Matrix2x2 = [
    [Complex64::new(0.5, -0.5), Complex64::new(0.5, -0.5)],
    [Complex64::new(-0.5, 0.5), Complex64::new(0.5, -0.5)],
];

// Two-qubit gates

/// SWAP
pub const SWAP: Matrix4x4 = [
    [ONE, ZERO, ZERO, ZERO],
    [ZERO, ZERO, ONE, ZERO],
    [ZERO, ONE, ZERO, ZERO],
    [ZERO, ZERO, ZERO, ONE],
];

// Parameterized gates

/// Phase gate U1(θ) = diag(1, e^(iθ))
pub fn phase(theta: f64) -> Matrix2x2 {
    [[ONE, ZERO], [ZERO, Complex64::from_polar(1.0, theta)]]
}

/// RX(θ) = exp(-iθX/2)
pub fn rotation_x(theta: f64) -> Matrix2x2 {
    let (sin, cos) = (theta / 2.0).sin_cos();
    [
        [Complex64::new(cos, 0.0), Complex64::new(0.0, -sin)],
        [Complex64::new(0.0, -sin), Complex64::new(cos, 0.0)],
    ]
}

/// RY(θ) = exp(-iθY/2)
pub fn rotation_y(theta: f64) -> Matrix2x2 {
    let (sin, cos) = (theta / 2.0).sin_cos();
    [
        [Complex64::new(cos, 0.0), Complex64::new(-sin, 0.0)],
        [Complex64::new(sin, 0.0), Complex64::new(cos, 0.0)],
    ]
}

/// RZ(θ) = exp(-iθZ/2)
pub fn rotation_z(theta: f64) -> Matrix2x2 {
    [
        [Complex64::from_polar(1.0, -theta / 2.0), ZERO],
        [ZERO, Complex64::from_polar(1.0, theta / 2.0)],
    ]
}
