//! Normalization checks
//!
//! Unitary gates preserve the norm by construction, so drift is only ever
//! reported here. Nothing in this crate renormalizes behind the caller's back.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

/// Norm diagnostics for a set of amplitudes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormReport {
    /// Sum of squared magnitudes
    pub total_probability: f64,
    /// |total_probability - 1|
    pub drift: f64,
    /// Tolerance the report was checked against
    pub tolerance: f64,
}

impl NormReport {
    /// Whether the drift is within tolerance
    pub fn is_valid(&self) -> bool {
        self.drift <= self.tolerance
    }
}

impl std::fmt::Display for NormReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "NormReport(total={:.12}, drift={:.2e}, tolerance={:.2e})",
            self.total_probability, self.drift, self.tolerance
        )
    }
}

/// Compute the norm drift of `amplitudes`
///
/// # Example
/// ```
/// use qsv_state::validation::validate_normalization;
/// use num_complex::Complex64;
///
/// let amplitudes = vec![
///     Complex64::new(1.0 / 2.0_f64.sqrt(), 0.0),
///     Complex64::new(1.0 / 2.0_f64.sqrt(), 0.0),
/// ];
///
/// let report = validate_normalization(&amplitudes, 1e-10);
/// assert!(report.is_valid());
/// ```
pub fn validate_normalization(amplitudes: &[Complex64], tolerance: f64) -> NormReport {
    let total_probability: f64 = amplitudes.iter().map(|a| a.norm_sqr()).sum();
    NormReport {
        total_probability,
        drift: (total_probability - 1.0).abs(),
        tolerance,
    }
}
