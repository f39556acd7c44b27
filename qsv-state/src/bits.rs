//! Bit manipulation over basis-state indices
//!
//! A basis-state index is an n-bit integer whose bit *i* holds qubit *i*.
//! These helpers move bits between a compact value and a set of qubit
//! positions inside such an index.

/// Insert a zero bit at each of `sorted_positions`
///
/// Positions must be strictly ascending. The bits of `value` fill the
/// remaining positions in order, so enumerating `value` over
/// `0..2^(n-k)` yields every index whose bits at `sorted_positions` are
/// all zero, in ascending order.
///
/// ```
/// use qsv_state::bits::insert_zero_bits;
///
/// // Free positions are 0 and 2 when position 1 is reserved.
/// assert_eq!(insert_zero_bits(0b11, &[1]), 0b101);
/// ```
#[inline]
pub fn insert_zero_bits(mut value: usize, sorted_positions: &[usize]) -> usize {
    for &pos in sorted_positions {
        let low = value & ((1usize << pos) - 1);
        value = low | ((value >> pos) << (pos + 1));
    }
    value
}

/// Scatter the low bits of `value` to the given positions
///
/// Bit *j* of `value` lands at `positions[j]`.
#[inline]
pub fn deposit_bits(value: usize, positions: &[usize]) -> usize {
    positions
        .iter()
        .enumerate()
        .fold(0, |acc, (j, &pos)| acc | (((value >> j) & 1) << pos))
}

/// Gather the bits at `positions` into a compact value
///
/// Bit `positions[j]` of `index` becomes bit *j* of the result.
#[inline]
pub fn extract_bits(index: usize, positions: &[usize]) -> usize {
    positions
        .iter()
        .enumerate()
        .fold(0, |acc, (j, &pos)| acc | (((index >> pos) & 1) << j))
}

/// Bit mask with every position set
#[inline]
pub fn mask_of(positions: &[usize]) -> usize {
    positions.iter().fold(0, |acc, &pos| acc | (1usize << pos))
}
