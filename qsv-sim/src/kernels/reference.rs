//! Sequential reference kernel
//!
//! Always runs the general gather / multiply / scatter loop regardless of
//! the plan's preferred path. Every other kernel is tested against this one.

use super::plan::GatePlan;
use num_complex::Complex64;
use qsv_core::ValidationError;

/// Apply a planned gate on the calling thread
///
/// # Errors
/// Returns [`ValidationError::DimensionMismatch`] if `amplitudes` does not
/// match the register size the plan was built for. Nothing is written in
/// that case.
pub fn apply(plan: &GatePlan<'_>, amplitudes: &mut [Complex64]) -> Result<(), ValidationError> {
    plan.check_dimension(amplitudes)?;

    let layout = plan.layout();
    let matrix = plan.gate().matrix();
    let offsets = layout.offsets();
    let mut gathered = vec![Complex64::new(0.0, 0.0); offsets.len()];

    for group in 0..layout.group_count() {
        let base = layout.base(group);

        for (slot, &offset) in gathered.iter_mut().zip(offsets) {
            *slot = amplitudes[base | offset];
        }

        for (row, &offset) in offsets.iter().enumerate() {
            amplitudes[base | offset] = matrix
                .row(row)
                .iter()
                .zip(&gathered)
                .map(|(m, a)| m * a)
                .sum();
        }
    }

    Ok(())
}
