//! Computational basis measurement
//!
//! This module provides:
//! - Lazy marginal probabilities over any qubit subset
//! - Single-shot sampling with optional collapse and renormalization
//! - Forced projection onto a chosen outcome
//! - Multi-shot sampling without collapse (alias method)
//!
//! Randomness is always injected by the caller so runs are reproducible.

use crate::amplitude_buffer::AmplitudeBuffer;
use crate::bits::{deposit_bits, extract_bits, insert_zero_bits};
use num_complex::Complex64;
use qsv_core::{NumericalError, ResourceError, Result, Tolerances, ValidationError};
use rand::Rng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt;

/// Largest measured subset (outcomes are stored in a u64)
pub const MAX_MEASURED_QUBITS: usize = 63;

/// Widest subset whose marginal distribution is materialized for sampling
///
/// Wider subsets are sampled by scanning the amplitudes directly, so drawing
/// from a 30-qubit register never allocates 2^30 probabilities.
pub const MAX_DENSE_MARGINAL_QUBITS: usize = 20;

/// Whether sampling over `width` qubits goes through a dense marginal
#[inline]
pub fn uses_dense_marginal(width: usize) -> bool {
    width <= MAX_DENSE_MARGINAL_QUBITS
}

/// Assignment of values to an ordered qubit subset
///
/// Bit *j* of `bits` is the value of the *j*-th measured qubit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Outcome {
    /// Packed qubit values
    pub bits: u64,
    /// Number of measured qubits
    pub width: usize,
}

impl Outcome {
    /// Create an outcome
    pub fn new(bits: u64, width: usize) -> Self {
        Self { bits, width }
    }

    /// Value of the *j*-th measured qubit
    pub fn bit(&self, j: usize) -> u8 {
        ((self.bits >> j) & 1) as u8
    }

    /// Bit-string with the last measured qubit first
    ///
    /// Measuring `[0, 1]` on |q1=1, q0=0⟩ yields `"10"`, matching the usual
    /// ket ordering.
    pub fn to_bitstring(&self) -> String {
        format!("{:0width$b}", self.bits, width = self.width)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_bitstring())
    }
}

/// Result of a single measurement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeasurementOutcome {
    /// Measured assignment
    pub outcome: Outcome,
    /// Probability of the outcome at draw time
    pub probability: f64,
}

/// Lazy sequence of `(assignment, marginal probability)` pairs
///
/// Yields one pair per assignment of the measured subset, in ascending order
/// of [`Outcome::bits`]. Each marginal sums over the 2^(n-m) basis states
/// consistent with the assignment, so a full pass costs O(2^n). Clone the
/// iterator (or call [`probabilities`] again) to restart.
#[derive(Clone)]
pub struct Probabilities<'a> {
    amplitudes: &'a [Complex64],
    qubits: SmallVec<[usize; 8]>,
    sorted: SmallVec<[usize; 8]>,
    next: u64,
    end: u64,
    free_states: usize,
}

impl<'a> Probabilities<'a> {
    fn marginal(&self, assignment: u64) -> f64 {
        marginal_of(self.amplitudes, &self.qubits, &self.sorted, self.free_states, assignment as usize)
    }
}

impl<'a> Iterator for Probabilities<'a> {
    type Item = (Outcome, f64);

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }
        let assignment = self.next;
        self.next += 1;
        Some((Outcome::new(assignment, self.qubits.len()), self.marginal(assignment)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.end - self.next) as usize;
        (remaining, Some(remaining))
    }
}

impl<'a> ExactSizeIterator for Probabilities<'a> {}

/// Sampling result containing counts from multiple shots
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplingResult {
    /// Map from packed outcome to count
    pub counts: HashMap<u64, usize>,

    /// Number of measured qubits
    pub width: usize,

    /// Total number of shots
    pub shots: usize,
}

impl SamplingResult {
    /// Create an empty sampling result
    pub fn new(width: usize, shots: usize) -> Self {
        Self {
            counts: HashMap::new(),
            width,
            shots,
        }
    }

    /// Record an outcome
    pub fn add_outcome(&mut self, outcome: u64) {
        *self.counts.entry(outcome).or_insert(0) += 1;
    }

    /// Get the count for an outcome
    pub fn get_count(&self, outcome: u64) -> usize {
        self.counts.get(&outcome).copied().unwrap_or(0)
    }

    /// Observed frequency of an outcome (count / shots)
    pub fn get_frequency(&self, outcome: u64) -> f64 {
        if self.shots == 0 {
            return 0.0;
        }
        self.get_count(outcome) as f64 / self.shots as f64
    }

    /// All outcomes sorted by count (descending)
    pub fn sorted_outcomes(&self) -> Vec<(u64, usize)> {
        let mut outcomes: Vec<_> = self.counts.iter().map(|(&k, &v)| (k, v)).collect();
        outcomes.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        outcomes
    }

    /// Counts keyed by bit-string
    pub fn to_bitstring_counts(&self) -> HashMap<String, usize> {
        self.counts
            .iter()
            .map(|(&outcome, &count)| (Outcome::new(outcome, self.width).to_bitstring(), count))
            .collect()
    }
}

/// Check that `qubits` is a valid measured subset of an n-qubit state
pub fn validate_subset(qubits: &[usize], num_qubits: usize) -> std::result::Result<(), ValidationError> {
    if qubits.len() > MAX_MEASURED_QUBITS {
        return Err(ValidationError::invalid_parameter("measured_qubits", qubits.len()));
    }
    for (i, &q) in qubits.iter().enumerate() {
        if q >= num_qubits {
            return Err(ValidationError::qubit_out_of_range(q, num_qubits));
        }
        if qubits[..i].contains(&q) {
            return Err(ValidationError::DuplicateQubit { qubit: q });
        }
    }
    Ok(())
}

/// Marginal probabilities over a qubit subset
///
/// # Errors
/// Validation error if the subset has an out-of-range or duplicate qubit.
///
/// # Example
/// ```
/// use qsv_state::{measurement, AmplitudeBuffer};
///
/// let state = AmplitudeBuffer::new(3).unwrap();
/// let probs: Vec<f64> = measurement::probabilities(&state, &[2])
///     .unwrap()
///     .map(|(_, p)| p)
///     .collect();
/// assert_eq!(probs, vec![1.0, 0.0]);
/// ```
pub fn probabilities<'a>(buffer: &'a AmplitudeBuffer, qubits: &[usize]) -> Result<Probabilities<'a>> {
    validate_subset(qubits, buffer.num_qubits())?;

    let mut sorted: SmallVec<[usize; 8]> = qubits.iter().copied().collect();
    sorted.sort_unstable();

    Ok(Probabilities {
        amplitudes: buffer.amplitudes(),
        qubits: qubits.iter().copied().collect(),
        sorted,
        next: 0,
        end: 1u64 << qubits.len(),
        free_states: 1usize << (buffer.num_qubits() - qubits.len()),
    })
}

/// Full marginal distribution over a subset in a single pass
///
/// Entry *a* is the probability of assignment *a*. The subset must already be
/// validated.
pub fn marginal_distribution(amplitudes: &[Complex64], qubits: &[usize]) -> Vec<f64> {
    let mut distribution = vec![0.0; 1usize << qubits.len()];
    accumulate_marginal(amplitudes, qubits, &mut distribution);
    distribution
}

/// [`marginal_distribution`] that reports a failed allocation instead of
/// aborting
///
/// # Errors
/// [`ResourceError::AllocationFailed`] if the 2^m entries cannot be reserved.
pub fn try_marginal_distribution(
    amplitudes: &[Complex64],
    qubits: &[usize],
) -> std::result::Result<Vec<f64>, ResourceError> {
    let len = 1usize << qubits.len();
    let mut distribution = Vec::new();
    distribution
        .try_reserve_exact(len)
        .map_err(|_| ResourceError::AllocationFailed {
            bytes: len.saturating_mul(std::mem::size_of::<f64>()),
        })?;
    distribution.resize(len, 0.0);
    accumulate_marginal(amplitudes, qubits, &mut distribution);
    Ok(distribution)
}

fn accumulate_marginal(amplitudes: &[Complex64], qubits: &[usize], distribution: &mut [f64]) {
    for (index, amp) in amplitudes.iter().enumerate() {
        distribution[extract_bits(index, qubits)] += amp.norm_sqr();
    }
}

/// Probability of one assignment, summed over the 2^(n-m) consistent indices
fn marginal_of(
    amplitudes: &[Complex64],
    qubits: &[usize],
    sorted: &[usize],
    free_states: usize,
    assignment: usize,
) -> f64 {
    let base = deposit_bits(assignment, qubits);
    (0..free_states)
        .map(|rest| amplitudes[base | insert_zero_bits(rest, sorted)].norm_sqr())
        .sum()
}

/// Draw one outcome and optionally collapse the state
///
/// Outcomes are drawn proportionally to their marginal probability. With
/// `collapse`, amplitudes inconsistent with the outcome are zeroed and the
/// rest divided by the square root of the outcome probability.
///
/// Subsets wider than [`MAX_DENSE_MARGINAL_QUBITS`] are drawn by a direct
/// scan over the amplitudes with no per-outcome storage.
///
/// # Errors
/// - Validation error for a bad subset
/// - [`NumericalError::DegenerateOutcome`] if the drawn outcome's probability
///   is below `tolerances.probability`
pub fn sample<R: Rng + ?Sized>(
    buffer: &mut AmplitudeBuffer,
    qubits: &[usize],
    collapse: bool,
    rng: &mut R,
    tolerances: &Tolerances,
) -> Result<MeasurementOutcome> {
    validate_subset(qubits, buffer.num_qubits())?;
    if uses_dense_marginal(qubits.len()) {
        let distribution = marginal_distribution(buffer.amplitudes(), qubits);
        return sample_from_distribution(buffer, qubits, &distribution, collapse, rng, tolerances);
    }

    let (assignment, probability) = draw_by_scan(buffer.amplitudes(), qubits, rng);
    finish_sample(buffer, qubits, assignment, probability, collapse, tolerances)
}

/// Draw one outcome from a precomputed marginal distribution
///
/// Used by backends that compute the distribution themselves. `distribution`
/// must come from the current contents of `buffer` over a validated subset.
pub fn sample_from_distribution<R: Rng + ?Sized>(
    buffer: &mut AmplitudeBuffer,
    qubits: &[usize],
    distribution: &[f64],
    collapse: bool,
    rng: &mut R,
    tolerances: &Tolerances,
) -> Result<MeasurementOutcome> {
    let (assignment, probability) = draw(distribution, rng);
    finish_sample(buffer, qubits, assignment, probability, collapse, tolerances)
}

fn finish_sample(
    buffer: &mut AmplitudeBuffer,
    qubits: &[usize],
    assignment: usize,
    probability: f64,
    collapse: bool,
    tolerances: &Tolerances,
) -> Result<MeasurementOutcome> {
    if probability < tolerances.probability {
        return Err(NumericalError::DegenerateOutcome {
            probability,
            tolerance: tolerances.probability,
        }
        .into());
    }

    if collapse {
        project(buffer, qubits, assignment, probability);
    }

    Ok(MeasurementOutcome {
        outcome: Outcome::new(assignment as u64, qubits.len()),
        probability,
    })
}

/// Project the state onto a chosen outcome
///
/// Returns the probability the outcome had before projection.
///
/// # Errors
/// - Validation error for a bad subset or an outcome wider than the subset
/// - [`NumericalError::DegenerateOutcome`] if the outcome has (near) zero
///   probability; the state is left unmodified in that case
pub fn collapse_to(
    buffer: &mut AmplitudeBuffer,
    qubits: &[usize],
    outcome: u64,
    tolerances: &Tolerances,
) -> Result<f64> {
    validate_subset(qubits, buffer.num_qubits())?;
    if qubits.len() < 64 && outcome >> qubits.len() != 0 {
        return Err(ValidationError::OutcomeOutOfRange {
            outcome,
            width: qubits.len(),
        }
        .into());
    }

    let mask = deposit_bits(usize::MAX, qubits);
    let target = deposit_bits(outcome as usize, qubits);
    let probability: f64 = buffer
        .amplitudes()
        .iter()
        .enumerate()
        .filter(|(i, _)| i & mask == target)
        .map(|(_, a)| a.norm_sqr())
        .sum();

    if probability < tolerances.probability {
        return Err(NumericalError::DegenerateOutcome {
            probability,
            tolerance: tolerances.probability,
        }
        .into());
    }

    project(buffer, qubits, outcome as usize, probability);
    Ok(probability)
}

/// Probability that `qubit` reads `value`
pub fn probability_of(buffer: &AmplitudeBuffer, qubit: usize, value: bool) -> Result<f64> {
    validate_subset(&[qubit], buffer.num_qubits())?;
    let mask = 1usize << qubit;
    let want = if value { mask } else { 0 };
    Ok(buffer
        .amplitudes()
        .iter()
        .enumerate()
        .filter(|(i, _)| i & mask == want)
        .map(|(_, a)| a.norm_sqr())
        .sum())
}

/// Expectation value of Pauli-Z on one qubit: p(0) - p(1)
pub fn pauli_z_expectation(buffer: &AmplitudeBuffer, qubit: usize) -> Result<f64> {
    let p0 = probability_of(buffer, qubit, false)?;
    let p1 = probability_of(buffer, qubit, true)?;
    Ok(p0 - p1)
}

/// Draw many shots without collapsing the state
///
/// Builds an alias table once (O(2^m)) and then samples each shot in O(1).
/// Subsets wider than [`MAX_DENSE_MARGINAL_QUBITS`] instead sort the shot
/// thresholds and resolve them all in one pass over the amplitudes.
pub fn sample_counts<R: Rng + ?Sized>(
    buffer: &AmplitudeBuffer,
    qubits: &[usize],
    shots: usize,
    rng: &mut R,
) -> Result<SamplingResult> {
    validate_subset(qubits, buffer.num_qubits())?;
    if shots == 0 {
        return Ok(SamplingResult::new(qubits.len(), 0));
    }

    if !uses_dense_marginal(qubits.len()) {
        return sample_counts_by_scan(buffer.amplitudes(), qubits, shots, rng);
    }

    let distribution = marginal_distribution(buffer.amplitudes(), qubits);
    sample_counts_from_distribution(qubits.len(), &distribution, shots, rng)
}

/// Many-shot sampling over a wide subset without a dense marginal
///
/// The subset must already be validated. Memory is O(shots).
pub fn sample_counts_by_scan<R: Rng + ?Sized>(
    amplitudes: &[Complex64],
    qubits: &[usize],
    shots: usize,
    rng: &mut R,
) -> Result<SamplingResult> {
    let mut result = SamplingResult::new(qubits.len(), shots);
    if shots == 0 {
        return Ok(result);
    }

    let total: f64 = amplitudes.iter().map(Complex64::norm_sqr).sum();
    if !(total > 0.0) {
        return Err(NumericalError::DegenerateOutcome {
            probability: total,
            tolerance: 0.0,
        }
        .into());
    }

    let mut thresholds: Vec<f64> = (0..shots).map(|_| rng.gen::<f64>() * total).collect();
    thresholds.sort_unstable_by(f64::total_cmp);

    let last = last_occupied(amplitudes);
    let mut pending = thresholds.iter().peekable();
    let mut cumulative = 0.0;
    for (index, amp) in amplitudes.iter().enumerate() {
        cumulative += amp.norm_sqr();
        while pending.next_if(|&&t| t < cumulative).is_some() {
            result.add_outcome(extract_bits(index, qubits) as u64);
        }
    }

    // Thresholds left over by rounding land on the last non-empty index.
    for _ in pending {
        result.add_outcome(extract_bits(last, qubits) as u64);
    }

    Ok(result)
}

/// Draw many shots from a precomputed marginal distribution
///
/// `distribution` must have `2^width` entries.
pub fn sample_counts_from_distribution<R: Rng + ?Sized>(
    width: usize,
    distribution: &[f64],
    shots: usize,
    rng: &mut R,
) -> Result<SamplingResult> {
    let mut result = SamplingResult::new(width, shots);
    if shots == 0 {
        return Ok(result);
    }

    let table = AliasTable::new(distribution)?;
    for _ in 0..shots {
        result.add_outcome(table.sample(rng) as u64);
    }

    Ok(result)
}

/// Inverse-CDF draw; returns the assignment and its probability
fn draw<R: Rng + ?Sized>(distribution: &[f64], rng: &mut R) -> (usize, f64) {
    let total: f64 = distribution.iter().sum();
    let threshold = rng.gen::<f64>() * total;

    let mut cumulative = 0.0;
    for (assignment, &p) in distribution.iter().enumerate() {
        cumulative += p;
        if threshold < cumulative {
            return (assignment, p);
        }
    }

    // Rounding can leave threshold == cumulative; take the last non-empty bin.
    distribution
        .iter()
        .enumerate()
        .rev()
        .find(|(_, p)| **p > 0.0)
        .map(|(a, &p)| (a, p))
        .unwrap_or((0, 0.0))
}

/// Inverse-CDF draw straight over the amplitudes
///
/// Picks a basis index with probability |a_i|^2, then reads the assignment
/// off it and sums that assignment's marginal. Uses no 2^m storage.
fn draw_by_scan<R: Rng + ?Sized>(amplitudes: &[Complex64], qubits: &[usize], rng: &mut R) -> (usize, f64) {
    let total: f64 = amplitudes.iter().map(Complex64::norm_sqr).sum();
    let threshold = rng.gen::<f64>() * total;

    let mut cumulative = 0.0;
    let chosen = amplitudes
        .iter()
        .position(|amp| {
            cumulative += amp.norm_sqr();
            threshold < cumulative
        })
        .unwrap_or_else(|| last_occupied(amplitudes));

    let mut sorted: SmallVec<[usize; 8]> = qubits.iter().copied().collect();
    sorted.sort_unstable();
    let free_states = amplitudes.len() >> qubits.len();
    let assignment = extract_bits(chosen, qubits);
    (assignment, marginal_of(amplitudes, qubits, &sorted, free_states, assignment))
}

fn last_occupied(amplitudes: &[Complex64]) -> usize {
    amplitudes.iter().rposition(|amp| amp.norm_sqr() > 0.0).unwrap_or(0)
}

/// Zero amplitudes inconsistent with `assignment`, rescale the rest
fn project(buffer: &mut AmplitudeBuffer, qubits: &[usize], assignment: usize, probability: f64) {
    let mask = deposit_bits(usize::MAX, qubits);
    let target = deposit_bits(assignment, qubits);
    let scale = 1.0 / probability.sqrt();

    for (index, amp) in buffer.amplitudes_mut().iter_mut().enumerate() {
        if index & mask == target {
            *amp *= scale;
        } else {
            *amp = Complex64::new(0.0, 0.0);
        }
    }
}

/// Alias table for O(1) sampling from a discrete distribution
///
/// Walker's alias method: O(n) setup, two uniform draws per sample.
struct AliasTable {
    /// Acceptance threshold for each bin
    prob: Vec<f64>,

    /// Alias bin used when the threshold rejects
    alias: Vec<usize>,
}

impl AliasTable {
    fn new(weights: &[f64]) -> Result<Self> {
        let n = weights.len();
        let total: f64 = weights.iter().sum();
        if n == 0 || !(total > 0.0) {
            return Err(NumericalError::DegenerateOutcome {
                probability: total,
                tolerance: 0.0,
            }
            .into());
        }

        let mut scaled: Vec<f64> = weights.iter().map(|&w| w * n as f64 / total).collect();
        let mut prob = vec![0.0; n];
        let mut alias = vec![0; n];

        let (mut small, mut large): (Vec<usize>, Vec<usize>) =
            (0..n).partition(|&i| scaled[i] < 1.0);

        while !small.is_empty() && !large.is_empty() {
            let (Some(s), Some(l)) = (small.pop(), large.pop()) else {
                break;
            };
            prob[s] = scaled[s];
            alias[s] = l;

            scaled[l] = (scaled[l] + scaled[s]) - 1.0;
            if scaled[l] < 1.0 {
                small.push(l);
            } else {
                large.push(l);
            }
        }

        // Leftovers are 1.0 up to rounding.
        for i in small.into_iter().chain(large) {
            prob[i] = 1.0;
        }

        Ok(Self { prob, alias })
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let i = rng.gen_range(0..self.prob.len());
        if rng.gen::<f64>() < self.prob[i] {
            i
        } else {
            self.alias[i]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use qsv_core::{ErrorKind, QsvError};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const H: f64 = std::f64::consts::FRAC_1_SQRT_2;

    fn bell_state() -> AmplitudeBuffer {
        let amplitudes = vec![
            Complex64::new(H, 0.0),
            Complex64::new(0.0, 0.0),
            Complex64::new(0.0, 0.0),
            Complex64::new(H, 0.0),
        ];
        AmplitudeBuffer::from_amplitudes(2, &amplitudes).unwrap()
    }

    #[test]
    fn test_outcome_bitstring() {
        let outcome = Outcome::new(0b101, 3);
        assert_eq!(outcome.to_bitstring(), "101");
        assert_eq!(outcome.bit(0), 1);
        assert_eq!(outcome.bit(1), 0);
        assert_eq!(outcome.bit(2), 1);
        assert_eq!(format!("{}", Outcome::new(1, 2)), "01");
    }

    #[test]
    fn test_probabilities_full_state() {
        let state = bell_state();
        let probs: Vec<_> = probabilities(&state, &[0, 1]).unwrap().collect();

        assert_eq!(probs.len(), 4);
        assert_relative_eq!(probs[0].1, 0.5, epsilon = 1e-12);
        assert_relative_eq!(probs[1].1, 0.0, epsilon = 1e-12);
        assert_relative_eq!(probs[2].1, 0.0, epsilon = 1e-12);
        assert_relative_eq!(probs[3].1, 0.5, epsilon = 1e-12);
        assert_eq!(probs[3].0.to_bitstring(), "11");
    }

    #[test]
    fn test_probabilities_marginal() {
        // |ψ⟩ = 0.6|00⟩ + 0.8|10⟩: qubit 1 is 1 with p = 0.64.
        let amplitudes = vec![
            Complex64::new(0.6, 0.0),
            Complex64::new(0.0, 0.0),
            Complex64::new(0.8, 0.0),
            Complex64::new(0.0, 0.0),
        ];
        let state = AmplitudeBuffer::from_amplitudes(2, &amplitudes).unwrap();

        let q1: Vec<f64> = probabilities(&state, &[1]).unwrap().map(|(_, p)| p).collect();
        assert_relative_eq!(q1[0], 0.36, epsilon = 1e-12);
        assert_relative_eq!(q1[1], 0.64, epsilon = 1e-12);

        let q0: Vec<f64> = probabilities(&state, &[0]).unwrap().map(|(_, p)| p).collect();
        assert_relative_eq!(q0[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(q0[1], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_probabilities_subset_order() {
        // Only |q1=1, q0=0⟩ populated; measuring [1, 0] packs q1 into bit 0.
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); 4];
        amplitudes[0b10] = Complex64::new(1.0, 0.0);
        let state = AmplitudeBuffer::from_amplitudes(2, &amplitudes).unwrap();

        let probs: Vec<_> = probabilities(&state, &[1, 0]).unwrap().collect();
        assert_relative_eq!(probs[0b01].1, 1.0);
        assert_eq!(probs[0b01].0.bit(0), 1);
    }

    #[test]
    fn test_probabilities_restartable() {
        let state = bell_state();
        let iter = probabilities(&state, &[0]).unwrap();
        assert_eq!(iter.len(), 2);

        let first: Vec<_> = iter.clone().collect();
        let second: Vec<_> = iter.collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_probabilities_empty_subset() {
        let state = bell_state();
        let probs: Vec<_> = probabilities(&state, &[]).unwrap().collect();
        assert_eq!(probs.len(), 1);
        assert_relative_eq!(probs[0].1, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_invalid_subsets() {
        let state = bell_state();
        let err = probabilities(&state, &[2]).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = probabilities(&state, &[0, 0]).err().unwrap();
        assert_eq!(
            err,
            QsvError::Validation(ValidationError::DuplicateQubit { qubit: 0 })
        );
    }

    #[test]
    fn test_marginal_distribution_matches_lazy() {
        let state = bell_state();
        let eager = marginal_distribution(state.amplitudes(), &[1]);
        let lazy: Vec<f64> = probabilities(&state, &[1]).unwrap().map(|(_, p)| p).collect();
        for (a, b) in eager.iter().zip(&lazy) {
            assert_relative_eq!(a, b, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_sample_collapses_bell_state() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut state = bell_state();

        let result = sample(&mut state, &[0], true, &mut rng, &Tolerances::default()).unwrap();
        assert_relative_eq!(result.probability, 0.5, epsilon = 1e-12);

        // Measuring qubit 0 fixes qubit 1 as well.
        let expected = if result.outcome.bits == 0 { 0 } else { 3 };
        assert_relative_eq!(state.read(expected).unwrap().re, 1.0, epsilon = 1e-12);
        assert_relative_eq!(state.norm(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_sample_without_collapse_leaves_state() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut state = bell_state();
        let before = state.amplitudes().to_vec();

        sample(&mut state, &[0, 1], false, &mut rng, &Tolerances::default()).unwrap();
        assert_eq!(state.amplitudes(), before.as_slice());
    }

    #[test]
    fn test_sample_degenerate_state() {
        let amplitudes = vec![Complex64::new(0.0, 0.0); 2];
        let mut state = AmplitudeBuffer::from_amplitudes(1, &amplitudes).unwrap();
        let mut rng = StdRng::seed_from_u64(1);

        let err = sample(&mut state, &[0], true, &mut rng, &Tolerances::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Numerical);
    }

    #[test]
    fn test_sample_frequencies_converge() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut state = bell_state();
        let tolerances = Tolerances::default();
        let mut counts = [0usize; 4];

        let shots = 2000;
        for _ in 0..shots {
            let result = sample(&mut state, &[0, 1], false, &mut rng, &tolerances).unwrap();
            counts[result.outcome.bits as usize] += 1;
        }

        assert_eq!(counts[1], 0);
        assert_eq!(counts[2], 0);
        let freq = counts[0] as f64 / shots as f64;
        // 5 sigma for p = 0.5, n = 2000 is about 0.056.
        assert!((freq - 0.5).abs() < 0.056, "frequency {}", freq);
    }

    #[test]
    fn test_collapse_to() {
        let mut state = bell_state();
        let p = collapse_to(&mut state, &[1], 1, &Tolerances::default()).unwrap();
        assert_relative_eq!(p, 0.5, epsilon = 1e-12);
        assert_relative_eq!(state.read(3).unwrap().re, 1.0, epsilon = 1e-12);
        assert_relative_eq!(state.read(0).unwrap().norm(), 0.0);
    }

    #[test]
    fn test_collapse_to_impossible_outcome() {
        let mut state = bell_state();
        let before = state.amplitudes().to_vec();

        let err = collapse_to(&mut state, &[0, 1], 0b01, &Tolerances::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Numerical);
        assert_eq!(state.amplitudes(), before.as_slice());

        let err = collapse_to(&mut state, &[0], 2, &Tolerances::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_probability_of_and_expectation() {
        let amplitudes = vec![Complex64::new(0.6, 0.0), Complex64::new(0.8, 0.0)];
        let state = AmplitudeBuffer::from_amplitudes(1, &amplitudes).unwrap();

        assert_relative_eq!(probability_of(&state, 0, false).unwrap(), 0.36, epsilon = 1e-12);
        assert_relative_eq!(probability_of(&state, 0, true).unwrap(), 0.64, epsilon = 1e-12);
        assert_relative_eq!(pauli_z_expectation(&state, 0).unwrap(), -0.28, epsilon = 1e-12);
    }

    #[test]
    fn test_sample_counts() {
        let amplitudes = vec![
            Complex64::new(0.6, 0.0),
            Complex64::new(0.8, 0.0),
            Complex64::new(0.0, 0.0),
            Complex64::new(0.0, 0.0),
        ];
        let state = AmplitudeBuffer::from_amplitudes(2, &amplitudes).unwrap();
        let mut rng = StdRng::seed_from_u64(42);

        let result = sample_counts(&state, &[0, 1], 4000, &mut rng).unwrap();
        assert_eq!(result.shots, 4000);
        assert_eq!(result.get_count(2) + result.get_count(3), 0);
        assert!((result.get_frequency(0) - 0.36).abs() < 0.04);
        assert!((result.get_frequency(1) - 0.64).abs() < 0.04);

        let by_string = result.to_bitstring_counts();
        assert_eq!(by_string.get("01"), Some(&result.get_count(1)));
    }

    #[test]
    fn test_sample_counts_zero_shots() {
        let state = bell_state();
        let mut rng = StdRng::seed_from_u64(0);
        let result = sample_counts(&state, &[0], 0, &mut rng).unwrap();
        assert!(result.counts.is_empty());
        assert_eq!(result.get_frequency(0), 0.0);
    }

    #[test]
    fn test_alias_table_nonuniform() {
        let weights = vec![0.5, 0.3, 0.15, 0.05];
        let table = AliasTable::new(&weights).unwrap();
        let mut rng = StdRng::seed_from_u64(123);
        let mut counts = [0usize; 4];

        let shots = 20000;
        for _ in 0..shots {
            counts[table.sample(&mut rng)] += 1;
        }

        for (i, (&p, &count)) in weights.iter().zip(counts.iter()).enumerate() {
            let freq = count as f64 / shots as f64;
            assert!((freq - p).abs() < 0.02, "outcome {} frequency {} vs {}", i, freq, p);
        }
    }

    #[test]
    fn test_sorted_outcomes() {
        let mut result = SamplingResult::new(1, 10);
        for _ in 0..6 {
            result.add_outcome(0);
        }
        for _ in 0..4 {
            result.add_outcome(1);
        }
        assert_eq!(result.sorted_outcomes(), vec![(0, 6), (1, 4)]);
    }

    fn uneven_state() -> AmplitudeBuffer {
        let raw: Vec<Complex64> = (0..8).map(|i| Complex64::new(1.0 + i as f64, 0.5 * i as f64)).collect();
        let norm = raw.iter().map(|a| a.norm_sqr()).sum::<f64>().sqrt();
        let amplitudes: Vec<Complex64> = raw.into_iter().map(|a| a / norm).collect();
        AmplitudeBuffer::from_amplitudes(3, &amplitudes).unwrap()
    }

    #[test]
    fn test_dense_marginal_threshold() {
        assert!(uses_dense_marginal(0));
        assert!(uses_dense_marginal(MAX_DENSE_MARGINAL_QUBITS));
        assert!(!uses_dense_marginal(MAX_DENSE_MARGINAL_QUBITS + 1));
        assert!(!uses_dense_marginal(30));
    }

    #[test]
    fn test_scan_draw_matches_dense_on_full_register() {
        let state = uneven_state();
        let qubits = [0, 1, 2];
        let distribution = marginal_distribution(state.amplitudes(), &qubits);

        for seed in 0..64 {
            let dense = draw(&distribution, &mut StdRng::seed_from_u64(seed));
            let scanned = draw_by_scan(state.amplitudes(), &qubits, &mut StdRng::seed_from_u64(seed));
            assert_eq!(dense, scanned, "seed {}", seed);
        }
    }

    #[test]
    fn test_scan_draw_on_subset() {
        let state = uneven_state();
        let qubits = [2, 0];
        let distribution = marginal_distribution(state.amplitudes(), &qubits);
        let mut rng = StdRng::seed_from_u64(11);
        let mut counts = [0usize; 4];

        let shots = 4000;
        for _ in 0..shots {
            let (assignment, probability) = draw_by_scan(state.amplitudes(), &qubits, &mut rng);
            assert_relative_eq!(probability, distribution[assignment], epsilon = 1e-12);
            counts[assignment] += 1;
        }

        for (assignment, &count) in counts.iter().enumerate() {
            let freq = count as f64 / shots as f64;
            assert!((freq - distribution[assignment]).abs() < 0.04, "assignment {}", assignment);
        }
    }

    #[test]
    fn test_sample_counts_by_scan() {
        let state = uneven_state();
        let qubits = [1, 2];
        let distribution = marginal_distribution(state.amplitudes(), &qubits);
        let mut rng = StdRng::seed_from_u64(5);

        let result = sample_counts_by_scan(state.amplitudes(), &qubits, 8000, &mut rng).unwrap();
        assert_eq!(result.counts.values().sum::<usize>(), 8000);
        for (assignment, &p) in distribution.iter().enumerate() {
            assert!((result.get_frequency(assignment as u64) - p).abs() < 0.03);
        }

        let zeros = AmplitudeBuffer::from_amplitudes(1, &[Complex64::new(0.0, 0.0); 2]).unwrap();
        let err = sample_counts_by_scan(zeros.amplitudes(), &[0], 10, &mut rng).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Numerical);
    }

    #[test]
    fn test_wide_register_sampled_without_dense_marginal() {
        let num_qubits = MAX_DENSE_MARGINAL_QUBITS + 1;
        let all: Vec<usize> = (0..num_qubits).collect();
        let marked = (1usize << (num_qubits - 1)) | 1;

        let mut amplitudes = vec![Complex64::new(0.0, 0.0); 1 << num_qubits];
        amplitudes[marked] = Complex64::new(0.0, 1.0);
        let mut state = AmplitudeBuffer::from_amplitudes(num_qubits, &amplitudes).unwrap();
        drop(amplitudes);

        let mut rng = StdRng::seed_from_u64(9);
        let shot = sample(&mut state, &all, true, &mut rng, &Tolerances::default()).unwrap();
        assert_eq!(shot.outcome.bits, marked as u64);
        assert_relative_eq!(shot.probability, 1.0, epsilon = 1e-12);
        assert_relative_eq!(state.norm(), 1.0, epsilon = 1e-12);

        let counts = sample_counts(&state, &all, 16, &mut rng).unwrap();
        assert_eq!(counts.get_count(marked as u64), 16);
    }

    #[test]
    fn test_try_marginal_distribution() {
        let state = uneven_state();
        let expected = marginal_distribution(state.amplitudes(), &[1, 0]);
        assert_eq!(try_marginal_distribution(state.amplitudes(), &[1, 0]).unwrap(), expected);
    }
}
