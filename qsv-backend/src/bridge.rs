//! Dispatch bridge
//!
//! The one object the orchestration layer holds. Backend selection happens
//! exactly once, in [`DispatchBridge::new`]; after that every operation goes
//! through the same backend for the bridge's lifetime.

use crate::backend::{BackendStatus, KernelBackend};
use crate::error::BackendLoadError;
use crate::reference::ReferenceBackend;
use qsv_core::{BackendPreference, KernelConfig, QsvError, Result};
use qsv_gates::{GateDescriptor, GateMatrix};
use qsv_sim::GatePlan;
use qsv_state::measurement::{self, MeasurementOutcome, Probabilities, SamplingResult};
use qsv_state::{AmplitudeBuffer, NormReport};
use rand::Rng;
use std::sync::Arc;
use tracing::{info, trace, warn};

/// Routes kernel and measurement calls to the selected backend
///
/// # Example
///
/// ```
/// use qsv_backend::DispatchBridge;
/// use qsv_core::KernelConfig;
/// use qsv_gates::standard;
///
/// let bridge = DispatchBridge::new(KernelConfig::default()).unwrap();
/// let mut state = bridge.create_state(2).unwrap();
///
/// bridge.apply_gate(&mut state, &standard::hadamard(0)).unwrap();
/// bridge.apply_gate(&mut state, &standard::cnot(0, 1).unwrap()).unwrap();
///
/// let probs: Vec<f64> = bridge.probabilities(&state, &[0, 1]).unwrap().map(|(_, p)| p).collect();
/// assert!((probs[0] - 0.5).abs() < 1e-12);
/// assert!((probs[3] - 0.5).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct DispatchBridge {
    backend: Arc<dyn KernelBackend>,
    config: KernelConfig,
    load_error: Option<BackendLoadError>,
}

impl DispatchBridge {
    /// Resolve the backend and build the bridge
    ///
    /// With [`BackendPreference::Auto`] the accelerated backend is tried
    /// first. If it fails to load, the bridge logs a warning, records the
    /// error and uses the reference backend from then on.
    ///
    /// # Errors
    /// Returns a validation error if `config` is invalid. Backend load
    /// failures are not errors.
    pub fn new(config: KernelConfig) -> Result<Self> {
        config.validate()?;
        let loaded = match config.backend {
            BackendPreference::ReferenceOnly => Ok(reference_backend()),
            BackendPreference::Auto => load_accelerated(&config),
        };
        Ok(Self::resolve(config, loaded))
    }

    /// Settle on a backend given the outcome of the accelerated load
    fn resolve(config: KernelConfig, loaded: std::result::Result<Arc<dyn KernelBackend>, BackendLoadError>) -> Self {
        let (backend, load_error) = match loaded {
            Ok(backend) => (backend, None),
            Err(err) => {
                warn!(error = %err, "accelerated backend unavailable, falling back to reference kernel");
                (reference_backend(), Some(err))
            }
        };

        info!(
            backend = backend.name(),
            preference = ?config.backend,
            degraded = load_error.is_some(),
            "dispatch bridge ready"
        );

        Self {
            backend,
            config,
            load_error,
        }
    }

    /// Build a bridge around an explicit backend
    pub fn with_backend(config: KernelConfig, backend: Arc<dyn KernelBackend>) -> Result<Self> {
        config.validate()?;
        info!(backend = backend.name(), "dispatch bridge ready with injected backend");
        Ok(Self {
            backend,
            config,
            load_error: None,
        })
    }

    /// Which backend is active
    pub fn backend_status(&self) -> BackendStatus {
        self.backend.status()
    }

    /// Name of the active backend
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Whether the accelerated backend was requested but failed to load
    pub fn is_degraded(&self) -> bool {
        self.load_error.is_some()
    }

    /// Load failure that caused the fallback, if any
    pub fn load_error(&self) -> Option<&BackendLoadError> {
        self.load_error.as_ref()
    }

    /// Active configuration
    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    /// Allocate an n-qubit state in |0...0⟩
    ///
    /// # Errors
    /// Returns a resource error above `config.max_qubits` or if the
    /// allocation fails.
    pub fn create_state(&self, num_qubits: usize) -> Result<AmplitudeBuffer> {
        Ok(AmplitudeBuffer::with_limit(num_qubits, self.config.max_qubits)?)
    }

    /// Apply a gate in place
    ///
    /// All validation runs before the first write, so on error the buffer is
    /// exactly as it was.
    pub fn apply_gate(&self, buffer: &mut AmplitudeBuffer, gate: &GateDescriptor) -> Result<()> {
        let plan = self.plan(gate, buffer.num_qubits())?;
        self.apply_plan(buffer, &plan)
    }

    /// Validate `gate` against an n-qubit register with this bridge's tolerances
    ///
    /// Every check [`DispatchBridge::apply_gate`] performs happens here, so a
    /// batch of gates can be planned up front and applied without any of
    /// them failing validation halfway through.
    pub fn plan<'g>(&self, gate: &'g GateDescriptor, num_qubits: usize) -> Result<GatePlan<'g>> {
        Ok(GatePlan::new(gate, num_qubits, &self.config.tolerances)?)
    }

    /// Apply an already validated plan in place
    ///
    /// # Errors
    /// Fails without writing if the plan was built for a different register
    /// size.
    pub fn apply_plan(&self, buffer: &mut AmplitudeBuffer, plan: &GatePlan<'_>) -> Result<()> {
        trace!(gate = %plan.gate(), backend = self.backend.name(), "apply gate");
        self.backend.apply(plan, buffer.amplitudes_mut())?;
        Ok(())
    }

    /// Apply an arbitrary matrix to `targets`, conditioned on `controls`
    pub fn apply(
        &self,
        buffer: &mut AmplitudeBuffer,
        targets: &[usize],
        controls: &[usize],
        matrix: GateMatrix,
    ) -> Result<()> {
        let gate = GateDescriptor::custom(matrix, targets, controls)?;
        self.apply_gate(buffer, &gate)
    }

    /// Lazy marginal probabilities over `qubits`
    pub fn probabilities<'a>(&self, buffer: &'a AmplitudeBuffer, qubits: &[usize]) -> Result<Probabilities<'a>> {
        measurement::probabilities(buffer, qubits)
    }

    /// Full marginal distribution over `qubits`
    ///
    /// Narrow subsets are computed by the backend. Wider ones are
    /// allocated fallibly.
    ///
    /// # Errors
    /// Returns a resource error if 2^m probabilities cannot be allocated.
    pub fn marginal_distribution(&self, buffer: &AmplitudeBuffer, qubits: &[usize]) -> Result<Vec<f64>> {
        measurement::validate_subset(qubits, buffer.num_qubits())?;
        if measurement::uses_dense_marginal(qubits.len()) {
            Ok(self.backend.marginal_distribution(buffer.amplitudes(), qubits))
        } else {
            Ok(measurement::try_marginal_distribution(buffer.amplitudes(), qubits)?)
        }
    }

    /// Draw one outcome over `qubits`, collapsing the state if asked
    pub fn sample<R: Rng + ?Sized>(
        &self,
        buffer: &mut AmplitudeBuffer,
        qubits: &[usize],
        collapse: bool,
        rng: &mut R,
    ) -> Result<MeasurementOutcome> {
        let outcome = if measurement::uses_dense_marginal(qubits.len()) {
            let distribution = self.marginal_distribution(buffer, qubits)?;
            measurement::sample_from_distribution(
                buffer,
                qubits,
                &distribution,
                collapse,
                rng,
                &self.config.tolerances,
            )?
        } else {
            measurement::sample(buffer, qubits, collapse, rng, &self.config.tolerances)?
        };
        trace!(outcome = %outcome.outcome, probability = outcome.probability, collapse, "sample");
        Ok(outcome)
    }

    /// Draw `shots` outcomes without touching the state
    pub fn sample_counts<R: Rng + ?Sized>(
        &self,
        buffer: &AmplitudeBuffer,
        qubits: &[usize],
        shots: usize,
        rng: &mut R,
    ) -> Result<SamplingResult> {
        if !measurement::uses_dense_marginal(qubits.len()) {
            return measurement::sample_counts(buffer, qubits, shots, rng);
        }
        let distribution = self.marginal_distribution(buffer, qubits)?;
        measurement::sample_counts_from_distribution(qubits.len(), &distribution, shots, rng)
    }

    /// Project onto a chosen outcome; returns its prior probability
    pub fn collapse_to(&self, buffer: &mut AmplitudeBuffer, qubits: &[usize], outcome: u64) -> Result<f64> {
        measurement::collapse_to(buffer, qubits, outcome, &self.config.tolerances)
    }

    /// Check the total probability against the norm drift tolerance
    ///
    /// # Errors
    /// Returns [`NumericalError::NormDrift`](qsv_core::NumericalError::NormDrift)
    /// when drift exceeds the tolerance. The state is never renormalized.
    pub fn check_norm(&self, buffer: &AmplitudeBuffer) -> Result<NormReport> {
        buffer.check_norm(self.config.tolerances.norm_drift).map_err(|err| {
            warn!(error = %err, qubits = buffer.num_qubits(), "norm drift beyond tolerance");
            QsvError::from(err)
        })
    }
}

fn reference_backend() -> Arc<dyn KernelBackend> {
    Arc::new(ReferenceBackend::new())
}

#[cfg(feature = "parallel")]
fn load_accelerated(config: &KernelConfig) -> std::result::Result<Arc<dyn KernelBackend>, BackendLoadError> {
    let backend: Arc<dyn KernelBackend> = Arc::new(crate::accelerated::AcceleratedBackend::load(config)?);
    Ok(backend)
}

#[cfg(not(feature = "parallel"))]
fn load_accelerated(_config: &KernelConfig) -> std::result::Result<Arc<dyn KernelBackend>, BackendLoadError> {
    Err(BackendLoadError::NotCompiled)
}
