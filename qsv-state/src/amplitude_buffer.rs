//! Amplitude storage with aligned memory

use crate::validation::{validate_normalization, NormReport};
use num_complex::Complex64;
use qsv_core::{NumericalError, QsvError, ResourceError, ValidationError};
use std::alloc::{alloc_zeroed, dealloc, Layout};
use std::fmt;
use std::ptr::NonNull;

/// Alignment of the amplitude array (64 bytes, one cache line)
const ALIGNMENT: usize = 64;

/// Default cap on the qubit count (16 GiB of amplitudes)
pub const DEFAULT_MAX_QUBITS: usize = 30;

/// Owned array of 2^n complex amplitudes
///
/// The buffer only stores amplitudes; gate logic lives in the kernel and
/// probability logic in [`crate::measurement`]. The qubit count is fixed for
/// the lifetime of the buffer.
///
/// # Example
///
/// ```
/// use qsv_state::AmplitudeBuffer;
/// use num_complex::Complex64;
///
/// let state = AmplitudeBuffer::new(2).unwrap();
/// assert_eq!(state.num_qubits(), 2);
/// assert_eq!(state.read(0), Some(Complex64::new(1.0, 0.0)));
/// assert_eq!(state.norm(), 1.0);
/// ```
pub struct AmplitudeBuffer {
    /// Number of qubits
    num_qubits: usize,

    /// Number of amplitudes (2^num_qubits)
    dimension: usize,

    /// Pointer to the aligned amplitude array
    data: NonNull<Complex64>,

    /// Layout used for deallocation
    layout: Layout,
}

impl AmplitudeBuffer {
    /// Allocate a state initialized to |0...0⟩
    ///
    /// # Errors
    /// Returns [`ResourceError`] if `num_qubits` exceeds
    /// [`DEFAULT_MAX_QUBITS`] or the allocation fails.
    pub fn new(num_qubits: usize) -> Result<Self, ResourceError> {
        Self::with_limit(num_qubits, DEFAULT_MAX_QUBITS)
    }

    /// Allocate a state initialized to |0...0⟩ with an explicit qubit cap
    pub fn with_limit(num_qubits: usize, max_qubits: usize) -> Result<Self, ResourceError> {
        if num_qubits > max_qubits || num_qubits >= usize::BITS as usize - 4 {
            return Err(ResourceError::TooManyQubits {
                requested: num_qubits,
                max: max_qubits,
            });
        }

        let dimension = 1usize << num_qubits;
        let bytes = dimension
            .checked_mul(std::mem::size_of::<Complex64>())
            .ok_or(ResourceError::AllocationFailed { bytes: usize::MAX })?;

        let layout = Layout::from_size_align(bytes, ALIGNMENT)
            .map_err(|_| ResourceError::AllocationFailed { bytes })?;

        // Safety: layout has non-zero size (dimension >= 1) and all-zero
        // bytes are a valid Complex64 (0.0 + 0.0i).
        let data = unsafe {
            let ptr = alloc_zeroed(layout) as *mut Complex64;
            let Some(ptr) = NonNull::new(ptr) else {
                return Err(ResourceError::AllocationFailed { bytes });
            };
            ptr.as_ptr().write(Complex64::new(1.0, 0.0));
            ptr
        };

        Ok(Self {
            num_qubits,
            dimension,
            data,
            layout,
        })
    }

    /// Create a buffer holding the given amplitudes
    ///
    /// The amplitudes are copied as-is; no normalization is applied.
    ///
    /// # Errors
    /// Validation error if `amplitudes.len() != 2^num_qubits`, resource error
    /// if the allocation fails.
    pub fn from_amplitudes(num_qubits: usize, amplitudes: &[Complex64]) -> Result<Self, QsvError> {
        let mut state = Self::with_limit(num_qubits, usize::BITS as usize - 5)?;

        if amplitudes.len() != state.dimension {
            return Err(ValidationError::DimensionMismatch {
                expected: state.dimension,
                actual: amplitudes.len(),
            }
            .into());
        }

        state.amplitudes_mut().copy_from_slice(amplitudes);
        Ok(state)
    }

    /// Get the number of qubits
    #[inline]
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Get the number of amplitudes (2^num_qubits)
    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Read the amplitude of one basis state
    #[inline]
    pub fn read(&self, index: usize) -> Option<Complex64> {
        self.amplitudes().get(index).copied()
    }

    /// Get the amplitudes as a slice
    #[inline]
    pub fn amplitudes(&self) -> &[Complex64] {
        // Safety: data points to `dimension` initialized amplitudes owned by self.
        unsafe { std::slice::from_raw_parts(self.data.as_ptr(), self.dimension) }
    }

    /// Get the amplitudes as a mutable slice
    #[inline]
    pub fn amplitudes_mut(&mut self) -> &mut [Complex64] {
        // Safety: &mut self guarantees exclusive access.
        unsafe { std::slice::from_raw_parts_mut(self.data.as_ptr(), self.dimension) }
    }

    /// Total probability: the sum of squared magnitudes
    ///
    /// Equals 1 for a valid state, within the norm drift tolerance.
    pub fn norm(&self) -> f64 {
        self.amplitudes().iter().map(|a| a.norm_sqr()).sum()
    }

    /// Report the norm drift of the buffer
    ///
    /// # Errors
    /// Returns [`NumericalError::NormDrift`] if the total probability deviates
    /// from 1 by more than `tolerance`.
    pub fn check_norm(&self, tolerance: f64) -> Result<NormReport, NumericalError> {
        let report = validate_normalization(self.amplitudes(), tolerance);
        if report.is_valid() {
            Ok(report)
        } else {
            Err(NumericalError::NormDrift {
                norm: report.total_probability,
                tolerance,
            })
        }
    }

    /// Reset the state to |0...0⟩
    pub fn reset(&mut self) {
        let amplitudes = self.amplitudes_mut();
        amplitudes.fill(Complex64::new(0.0, 0.0));
        amplitudes[0] = Complex64::new(1.0, 0.0);
    }

    /// Copy the buffer into a new allocation
    pub fn clone_state(&self) -> Result<Self, ResourceError> {
        let mut copy = Self::with_limit(self.num_qubits, self.num_qubits)?;
        copy.amplitudes_mut().copy_from_slice(self.amplitudes());
        Ok(copy)
    }

    /// Size of the amplitude array in bytes
    pub fn memory_bytes(&self) -> usize {
        self.layout.size()
    }

    /// Check that the array is cache-line aligned
    #[inline]
    pub fn is_aligned(&self) -> bool {
        (self.data.as_ptr() as usize) % ALIGNMENT == 0
    }
}

impl Drop for AmplitudeBuffer {
    fn drop(&mut self) {
        // Safety: data was allocated with this exact layout.
        unsafe {
            dealloc(self.data.as_ptr() as *mut u8, self.layout);
        }
    }
}

impl fmt::Debug for AmplitudeBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AmplitudeBuffer")
            .field("num_qubits", &self.num_qubits)
            .field("dimension", &self.dimension)
            .finish()
    }
}

// Safety: AmplitudeBuffer owns its data and hands out access only through
// &self / &mut self.
unsafe impl Send for AmplitudeBuffer {}
unsafe impl Sync for AmplitudeBuffer {}
