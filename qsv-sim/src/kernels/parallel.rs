//! Rayon-parallel kernels
//!
//! Work is split across a caller-supplied thread pool. Each task owns a
//! disjoint set of amplitude groups, so no two tasks ever touch the same
//! index and results match the sequential kernel up to floating point
//! reassociation in the marginal sums.

use super::plan::{GatePlan, KernelPath};
use num_complex::Complex64;
use qsv_core::ValidationError;
use qsv_state::bits::extract_bits;
use rayon::prelude::*;
use rayon::ThreadPool;
use smallvec::{smallvec, SmallVec};
use tracing::trace;

/// Minimum amplitudes handed to one rayon task for element-wise loops
const MIN_ELEMENTS_PER_TASK: usize = 1 << 10;

/// Minimum groups handed to one rayon task for the dense loop
const MIN_GROUPS_PER_TASK: usize = 1 << 6;

/// Marginals over more qubits than this are summed sequentially; a per-task
/// accumulator would be as large as the state itself
const MAX_PARALLEL_MARGINAL_QUBITS: usize = 12;

/// Raw pointer that may cross thread boundaries
///
/// Only used where tasks write provably disjoint index sets.
#[derive(Clone, Copy)]
struct SendPtr<T>(*mut T);
unsafe impl<T> Send for SendPtr<T> {}
unsafe impl<T> Sync for SendPtr<T> {}

impl<T> SendPtr<T> {
    #[inline]
    fn get(self) -> *mut T {
        self.0
    }
}

/// Apply a planned gate using `pool`
///
/// # Errors
/// Returns [`ValidationError::DimensionMismatch`] if `amplitudes` does not
/// match the register size the plan was built for.
pub fn apply(plan: &GatePlan<'_>, amplitudes: &mut [Complex64], pool: &ThreadPool) -> Result<(), ValidationError> {
    plan.check_dimension(amplitudes)?;
    trace!(gate = %plan.gate(), path = ?plan.path(), "parallel kernel");

    pool.install(|| match (plan.path(), plan.diagonal()) {
        (KernelPath::Diagonal, Some(diagonal)) => apply_diagonal(plan, diagonal, amplitudes),
        (KernelPath::SingleQubit, _) => apply_single_qubit(plan, amplitudes),
        _ => apply_dense(plan, amplitudes),
    });
    Ok(())
}

/// Scale every enabled amplitude by its diagonal entry
fn apply_diagonal(plan: &GatePlan<'_>, diagonal: &[Complex64], amplitudes: &mut [Complex64]) {
    let targets = plan.gate().targets();
    let control_mask = plan.layout().control_mask();

    amplitudes
        .par_iter_mut()
        .enumerate()
        .with_min_len(MIN_ELEMENTS_PER_TASK)
        .for_each(|(index, amp)| {
            if index & control_mask == control_mask {
                *amp *= diagonal[extract_bits(index, targets)];
            }
        });
}

/// 2x2 butterfly over (index, index + stride) pairs
fn apply_single_qubit(plan: &GatePlan<'_>, amplitudes: &mut [Complex64]) {
    let stride = 1usize << plan.gate().targets()[0];
    let control_mask = plan.layout().control_mask();
    let m = plan.gate().matrix();
    let (m00, m01, m10, m11) = (m[(0, 0)], m[(0, 1)], m[(1, 0)], m[(1, 1)]);

    amplitudes
        .par_chunks_mut(stride * 2)
        .enumerate()
        .for_each(|(chunk_index, chunk)| {
            let chunk_base = chunk_index * stride * 2;
            let (low, high) = chunk.split_at_mut(stride);

            low.par_iter_mut()
                .zip(high.par_iter_mut())
                .enumerate()
                .with_min_len(MIN_ELEMENTS_PER_TASK)
                .for_each(|(offset, (a0, a1))| {
                    if (chunk_base + offset) & control_mask == control_mask {
                        let (a, b) = (*a0, *a1);
                        *a0 = m00 * a + m01 * b;
                        *a1 = m10 * a + m11 * b;
                    }
                });
        });
}

/// General gather / multiply / scatter, split into contiguous group ranges
fn apply_dense(plan: &GatePlan<'_>, amplitudes: &mut [Complex64]) {
    let layout = plan.layout();
    let matrix = plan.gate().matrix();
    let offsets = layout.offsets();
    let group_count = layout.group_count();

    let per_task = (group_count / (rayon::current_num_threads() * 4)).max(MIN_GROUPS_PER_TASK);
    let tasks = (group_count + per_task - 1) / per_task;
    let ptr = SendPtr(amplitudes.as_mut_ptr());

    (0..tasks).into_par_iter().for_each(|task| {
        let start = task * per_task;
        let end = (start + per_task).min(group_count);
        let mut gathered: SmallVec<[Complex64; 16]> = smallvec![Complex64::new(0.0, 0.0); offsets.len()];

        for group in start..end {
            let base = layout.base(group);

            // SAFETY: every index below is `base | offset` for a group in
            // this task's range. Groups partition the index space and the
            // ranges are disjoint, so no other task reads or writes these
            // slots. All indices are < amplitudes.len() because the plan's
            // dimension was checked against the slice.
            unsafe {
                for (slot, &offset) in gathered.iter_mut().zip(offsets) {
                    *slot = *ptr.get().add(base | offset);
                }
                for (row, &offset) in offsets.iter().enumerate() {
                    *ptr.get().add(base | offset) = matrix
                        .row(row)
                        .iter()
                        .zip(gathered.iter())
                        .map(|(m, a)| m * a)
                        .sum();
                }
            }
        }
    });
}

/// Marginal distribution over `qubits` computed on `pool`
///
/// The subset must already be validated.
pub fn marginal_distribution(amplitudes: &[Complex64], qubits: &[usize], pool: &ThreadPool) -> Vec<f64> {
    if qubits.len() > MAX_PARALLEL_MARGINAL_QUBITS {
        return qsv_state::measurement::marginal_distribution(amplitudes, qubits);
    }

    let width = 1usize << qubits.len();
    pool.install(|| {
        amplitudes
            .par_iter()
            .enumerate()
            .with_min_len(MIN_ELEMENTS_PER_TASK)
            .fold(
                || vec![0.0; width],
                |mut acc, (index, amp)| {
                    acc[extract_bits(index, qubits)] += amp.norm_sqr();
                    acc
                },
            )
            .reduce(
                || vec![0.0; width],
                |mut left, right| {
                    for (l, r) in left.iter_mut().zip(right) {
                        *l += r;
                    }
                    left
                },
            )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernels::reference;
    use approx::assert_relative_eq;
    use qsv_core::Tolerances;
    use qsv_gates::{standard, GateDescriptor};
    use rayon::ThreadPoolBuilder;

    fn pool() -> ThreadPool {
        ThreadPoolBuilder::new().num_threads(4).build().unwrap()
    }

    fn spread_state(num_qubits: usize) -> Vec<Complex64> {
        let dim = 1usize << num_qubits;
        let raw: Vec<Complex64> = (0..dim)
            .map(|i| Complex64::new((i as f64 * 0.37).sin(), (i as f64 * 0.11).cos()))
            .collect();
        let norm = raw.iter().map(|a| a.norm_sqr()).sum::<f64>().sqrt();
        raw.into_iter().map(|a| a / norm).collect()
    }

    fn assert_matches_reference(gate: &GateDescriptor, num_qubits: usize) {
        let plan = GatePlan::new(gate, num_qubits, &Tolerances::default()).unwrap();
        let mut expected = spread_state(num_qubits);
        let mut actual = expected.clone();

        reference::apply(&plan, &mut expected).unwrap();
        apply(&plan, &mut actual, &pool()).unwrap();

        for (e, a) in expected.iter().zip(&actual) {
            assert_relative_eq!(e.re, a.re, epsilon = 1e-12);
            assert_relative_eq!(e.im, a.im, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_single_qubit_every_target() {
        for target in 0..12 {
            assert_matches_reference(&standard::hadamard(target), 12);
            assert_matches_reference(&standard::ry(target, 0.4).unwrap(), 12);
        }
    }

    #[test]
    fn test_controlled_single_qubit() {
        assert_matches_reference(&standard::cnot(11, 0).unwrap(), 12);
        assert_matches_reference(&standard::ch(0, 11).unwrap(), 12);
        assert_matches_reference(&standard::mcx(&[1, 5, 9], 3).unwrap(), 12);
    }

    #[test]
    fn test_diagonal() {
        assert_matches_reference(&standard::t(7), 12);
        assert_matches_reference(&standard::cz(2, 10).unwrap(), 12);
        assert_matches_reference(&standard::crz(4, 1, 1.1).unwrap(), 12);
    }

    #[test]
    fn test_dense() {
        assert_matches_reference(&standard::swap(0, 11).unwrap(), 12);
        assert_matches_reference(&standard::cswap(3, 8, 1).unwrap(), 12);
        assert_matches_reference(&standard::swap(0, 1).unwrap(), 2);
    }

    #[test]
    fn test_parallel_marginal_matches_sequential() {
        let amps = spread_state(10);
        let qubits = [7, 0, 3];
        let expected = qsv_state::measurement::marginal_distribution(&amps, &qubits);
        let actual = marginal_distribution(&amps, &qubits, &pool());
        for (e, a) in expected.iter().zip(&actual) {
            assert_relative_eq!(*e, *a, epsilon = 1e-12);
        }
        assert_relative_eq!(actual.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
    }
}
