//! Index arithmetic for gate application
//!
//! A gate on k targets with c controls partitions the 2^n basis indices of
//! an n-qubit state into groups of 2^k. All indices in a group agree on every
//! non-target bit, and the group's local index *j* selects the target bits
//! (bit *b* of *j* is the value of `targets[b]`).
//!
//! Controls are folded into the enumeration: control bits are reserved like
//! target bits and then forced to 1 in every group base, so only the
//! 2^(n-k-c) groups whose controls are all set are ever visited.

use qsv_state::bits::{deposit_bits, insert_zero_bits, mask_of};
use smallvec::SmallVec;

/// Group enumeration for one gate on one register size
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupLayout {
    num_qubits: usize,
    /// Targets and controls, ascending
    reserved: SmallVec<[usize; 8]>,
    control_mask: usize,
    /// `offsets[j]` is local state *j* deposited at the target positions
    offsets: SmallVec<[usize; 16]>,
    group_count: usize,
}

impl GroupLayout {
    /// Build the layout
    ///
    /// Qubits must already be validated: in range, distinct, and controls
    /// disjoint from targets.
    pub fn new(num_qubits: usize, targets: &[usize], controls: &[usize]) -> Self {
        let mut reserved: SmallVec<[usize; 8]> = targets.iter().chain(controls).copied().collect();
        reserved.sort_unstable();
        debug_assert!(reserved.windows(2).all(|w| w[0] < w[1]));
        debug_assert!(reserved.len() <= num_qubits);

        let offsets = (0..1usize << targets.len())
            .map(|local| deposit_bits(local, targets))
            .collect();

        Self {
            num_qubits,
            group_count: 1usize << (num_qubits - reserved.len()),
            reserved,
            control_mask: mask_of(controls),
            offsets,
        }
    }

    /// Register size the layout was built for
    #[inline]
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Number of amplitudes in the register
    #[inline]
    pub fn dimension(&self) -> usize {
        1usize << self.num_qubits
    }

    /// Number of groups with every control set
    #[inline]
    pub fn group_count(&self) -> usize {
        self.group_count
    }

    /// Bit mask of the control qubits
    #[inline]
    pub fn control_mask(&self) -> usize {
        self.control_mask
    }

    /// Offsets of the 2^k local states relative to a group base
    #[inline]
    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    /// Index of local state 0 in group `group`
    #[inline]
    pub fn base(&self, group: usize) -> usize {
        insert_zero_bits(group, &self.reserved) | self.control_mask
    }

    /// All basis indices of group `group`, in local-state order
    pub fn indices(&self, group: usize) -> impl Iterator<Item = usize> + '_ {
        let base = self.base(group);
        self.offsets.iter().map(move |&offset| base | offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_target_groups() {
        let layout = GroupLayout::new(3, &[1], &[]);
        assert_eq!(layout.group_count(), 4);
        assert_eq!(layout.offsets(), &[0, 2]);

        let groups: Vec<Vec<usize>> = (0..4).map(|g| layout.indices(g).collect()).collect();
        assert_eq!(groups, vec![vec![0, 2], vec![1, 3], vec![4, 6], vec![5, 7]]);
    }

    #[test]
    fn test_target_order_sets_local_bits() {
        // targets [2, 0]: local bit 0 is qubit 2, local bit 1 is qubit 0
        let layout = GroupLayout::new(3, &[2, 0], &[]);
        assert_eq!(layout.offsets(), &[0b000, 0b100, 0b001, 0b101]);
        assert_eq!(layout.group_count(), 2);
        assert_eq!(layout.base(1), 0b010);
    }

    #[test]
    fn test_groups_partition_register() {
        let layout = GroupLayout::new(5, &[3, 1], &[]);
        let mut seen = vec![0u32; layout.dimension()];
        for group in 0..layout.group_count() {
            for index in layout.indices(group) {
                seen[index] += 1;
            }
        }
        assert!(seen.iter().all(|&count| count == 1));
    }

    #[test]
    fn test_controls_visit_only_enabled_indices() {
        let layout = GroupLayout::new(4, &[0], &[2, 3]);
        assert_eq!(layout.control_mask(), 0b1100);
        assert_eq!(layout.group_count(), 2);

        let mut visited: Vec<usize> = (0..layout.group_count()).flat_map(|g| layout.indices(g)).collect();
        visited.sort_unstable();
        assert_eq!(visited, vec![0b1100, 0b1101, 0b1110, 0b1111]);
    }

    #[test]
    fn test_full_width_gate() {
        let layout = GroupLayout::new(2, &[0, 1], &[]);
        assert_eq!(layout.group_count(), 1);
        assert_eq!(layout.indices(0).collect::<Vec<_>>(), vec![0, 1, 2, 3]);
    }
}
