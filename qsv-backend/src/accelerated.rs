//! Multi-threaded backend on a dedicated rayon pool

use crate::backend::{BackendStatus, KernelBackend};
use crate::error::BackendLoadError;
use num_complex::Complex64;
use qsv_core::{KernelConfig, ValidationError};
use qsv_sim::kernels::{parallel, reference};
use qsv_sim::GatePlan;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::debug;

/// Backend that splits large gates across worker threads
///
/// States smaller than the configured parallel threshold still run on the
/// calling thread; the pool only pays off once groups outnumber workers.
#[derive(Debug)]
pub struct AcceleratedBackend {
    pool: ThreadPool,
    parallel_threshold: usize,
}

impl AcceleratedBackend {
    /// Build the worker pool
    ///
    /// # Errors
    /// Returns [`BackendLoadError::ThreadPool`] if the pool cannot be created.
    pub fn load(config: &KernelConfig) -> Result<Self, BackendLoadError> {
        let mut builder = ThreadPoolBuilder::new().thread_name(|index| format!("qsv-worker-{}", index));
        if let Some(threads) = config.worker_threads {
            builder = builder.num_threads(threads);
        }

        let pool = builder.build().map_err(|e| BackendLoadError::ThreadPool {
            reason: e.to_string(),
        })?;

        debug!(
            threads = pool.current_num_threads(),
            parallel_threshold = config.parallel_threshold,
            "accelerated backend loaded"
        );

        Ok(Self {
            pool,
            parallel_threshold: config.parallel_threshold,
        })
    }

    /// Number of worker threads
    pub fn num_threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Minimum qubit count before work is split across threads
    pub fn parallel_threshold(&self) -> usize {
        self.parallel_threshold
    }

    #[inline]
    fn use_parallel(&self, dimension: usize) -> bool {
        dimension.trailing_zeros() as usize >= self.parallel_threshold
    }
}

impl KernelBackend for AcceleratedBackend {
    fn name(&self) -> &str {
        "accelerated"
    }

    fn status(&self) -> BackendStatus {
        BackendStatus::Accelerated
    }

    fn apply(&self, plan: &GatePlan<'_>, amplitudes: &mut [Complex64]) -> Result<(), ValidationError> {
        if self.use_parallel(amplitudes.len()) {
            parallel::apply(plan, amplitudes, &self.pool)
        } else {
            reference::apply(plan, amplitudes)
        }
    }

    fn marginal_distribution(&self, amplitudes: &[Complex64], qubits: &[usize]) -> Vec<f64> {
        if self.use_parallel(amplitudes.len()) {
            parallel::marginal_distribution(amplitudes, qubits, &self.pool)
        } else {
            qsv_state::measurement::marginal_distribution(amplitudes, qubits)
        }
    }
}
