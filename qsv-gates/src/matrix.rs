//! Dense gate matrices of any power-of-two dimension

use crate::matrices::{Matrix2x2, Matrix4x4};
use num_complex::Complex64;
use qsv_core::ValidationError;
use std::ops::Index;

/// Widest matrix [`GateMatrix::identity`] will build (4096 x 4096)
pub const MAX_MATRIX_QUBITS: usize = 12;

/// Square complex matrix acting on one or more qubits
///
/// Stored row-major. The dimension is always a power of two.
#[derive(Debug, Clone, PartialEq)]
pub struct GateMatrix {
    dim: usize,
    data: Vec<Complex64>,
}

impl GateMatrix {
    /// Create a matrix from row-major data
    ///
    /// # Errors
    /// Returns [`ValidationError::MalformedMatrix`] if `dim` is not a power of
    /// two or `data.len() != dim * dim`.
    pub fn new(dim: usize, data: Vec<Complex64>) -> Result<Self, ValidationError> {
        if !dim.is_power_of_two() || dim < 2 {
            return Err(ValidationError::MalformedMatrix {
                reason: format!("dimension {} is not a power of two >= 2", dim),
            });
        }
        if data.len() != dim * dim {
            return Err(ValidationError::MalformedMatrix {
                reason: format!("expected {} entries, got {}", dim * dim, data.len()),
            });
        }
        Ok(Self { dim, data })
    }

    /// Create a matrix from nested rows
    pub fn from_rows(rows: &[Vec<Complex64>]) -> Result<Self, ValidationError> {
        let dim = rows.len();
        if rows.iter().any(|row| row.len() != dim) {
            return Err(ValidationError::MalformedMatrix {
                reason: "rows have inconsistent length".to_string(),
            });
        }
        Self::new(dim, rows.iter().flatten().copied().collect())
    }

    /// Create a single-qubit matrix
    pub fn from_2x2(matrix: &Matrix2x2) -> Self {
        Self {
            dim: 2,
            data: matrix.iter().flatten().copied().collect(),
        }
    }

    /// Create a two-qubit matrix
    pub fn from_4x4(matrix: &Matrix4x4) -> Self {
        Self {
            dim: 4,
            data: matrix.iter().flatten().copied().collect(),
        }
    }

    /// Identity on `num_qubits` qubits
    ///
    /// # Errors
    /// Returns [`ValidationError::InvalidParameter`] above
    /// [`MAX_MATRIX_QUBITS`].
    pub fn identity(num_qubits: usize) -> Result<Self, ValidationError> {
        if num_qubits > MAX_MATRIX_QUBITS {
            return Err(ValidationError::invalid_parameter("num_qubits", num_qubits));
        }
        let dim = 1usize << num_qubits.max(1);
        let mut data = vec![Complex64::new(0.0, 0.0); dim * dim];
        for i in 0..dim {
            data[i * dim + i] = Complex64::new(1.0, 0.0);
        }
        Ok(Self { dim, data })
    }

    /// Matrix dimension (2^num_qubits)
    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of qubits the matrix acts on
    #[inline]
    pub fn num_qubits(&self) -> usize {
        self.dim.trailing_zeros() as usize
    }

    /// Entry at (row, col)
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Complex64 {
        self.data[row * self.dim + col]
    }

    /// One row as a slice
    #[inline]
    pub fn row(&self, row: usize) -> &[Complex64] {
        &self.data[row * self.dim..(row + 1) * self.dim]
    }

    /// Row-major entries
    #[inline]
    pub fn as_slice(&self) -> &[Complex64] {
        &self.data
    }

    /// Conjugate transpose
    pub fn adjoint(&self) -> Self {
        let dim = self.dim;
        let mut data = Vec::with_capacity(dim * dim);
        for row in 0..dim {
            for col in 0..dim {
                data.push(self.get(col, row).conj());
            }
        }
        Self { dim, data }
    }

    /// Matrix product `self * other`
    pub fn multiply(&self, other: &GateMatrix) -> Result<Self, ValidationError> {
        if self.dim != other.dim {
            return Err(ValidationError::DimensionMismatch {
                expected: self.dim,
                actual: other.dim,
            });
        }
        let dim = self.dim;
        let mut data = vec![Complex64::new(0.0, 0.0); dim * dim];
        for i in 0..dim {
            for k in 0..dim {
                let a = self.get(i, k);
                if a == Complex64::new(0.0, 0.0) {
                    continue;
                }
                for j in 0..dim {
                    data[i * dim + j] += a * other.get(k, j);
                }
            }
        }
        Ok(Self { dim, data })
    }

    /// Largest absolute entry of `M * M^dagger - I`
    pub fn unitarity_deviation(&self) -> f64 {
        let dim = self.dim;
        let mut worst: f64 = 0.0;
        for i in 0..dim {
            for j in 0..dim {
                // (M M†)_ij = Σ_k M_ik conj(M_jk)
                let dot: Complex64 = self
                    .row(i)
                    .iter()
                    .zip(self.row(j))
                    .map(|(a, b)| a * b.conj())
                    .sum();
                let expected = if i == j { 1.0 } else { 0.0 };
                worst = worst.max((dot - Complex64::new(expected, 0.0)).norm());
            }
        }
        if self.data.iter().any(|z| !z.is_finite()) {
            return f64::INFINITY;
        }
        worst
    }

    /// Check `M * M^dagger = I` within tolerance
    pub fn is_unitary(&self, tolerance: f64) -> bool {
        self.unitarity_deviation() <= tolerance
    }

    /// Check that every off-diagonal entry is (near) zero
    pub fn is_diagonal(&self, tolerance: f64) -> bool {
        let dim = self.dim;
        (0..dim).all(|i| (0..dim).all(|j| i == j || self.get(i, j).norm() <= tolerance))
    }

    /// Diagonal entries
    pub fn diagonal(&self) -> Vec<Complex64> {
        (0..self.dim).map(|i| self.get(i, i)).collect()
    }

    /// Entry-wise comparison within tolerance
    pub fn approx_eq(&self, other: &GateMatrix, tolerance: f64) -> bool {
        self.dim == other.dim
            && self
                .data
                .iter()
                .zip(&other.data)
                .all(|(a, b)| (a - b).norm() <= tolerance)
    }
}

impl Index<(usize, usize)> for GateMatrix {
    type Output = Complex64;

    fn index(&self, (row, col): (usize, usize)) -> &Complex64 {
        &self.data[row * self.dim + col]
    }
}
