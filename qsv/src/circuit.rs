//! Gate sequence recorder
//!
//! A [`Circuit`] is an ordered list of gate descriptors bound to a fixed
//! register size. It does no simulation itself; [`Circuit::run`] feeds the
//! gates to a [`DispatchBridge`] one at a time.

use qsv_backend::DispatchBridge;
use qsv_core::{Result, ValidationError};
use qsv_gates::{standard, GateDescriptor, GateMatrix};
use qsv_state::AmplitudeBuffer;
use std::f64::consts::PI;
use std::fmt;
use tracing::debug;

/// A recorded sequence of gates
///
/// # Example
/// ```
/// use qsv::{Circuit, DispatchBridge, KernelConfig};
///
/// let mut circuit = Circuit::new(2);
/// circuit.h(0).unwrap().cx(0, 1).unwrap();
///
/// let bridge = DispatchBridge::new(KernelConfig::default()).unwrap();
/// let state = circuit.execute(&bridge).unwrap();
/// assert!((state.norm() - 1.0).abs() < 1e-12);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Circuit {
    num_qubits: usize,
    gates: Vec<GateDescriptor>,
}

impl Circuit {
    /// Create an empty circuit over `num_qubits` qubits
    pub fn new(num_qubits: usize) -> Self {
        Self {
            num_qubits,
            gates: Vec::new(),
        }
    }

    /// Number of qubits
    #[inline]
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Number of recorded gates
    #[inline]
    pub fn len(&self) -> usize {
        self.gates.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }

    /// Recorded gates in application order
    pub fn gates(&self) -> impl Iterator<Item = &GateDescriptor> {
        self.gates.iter()
    }

    /// Gate at position `index`
    pub fn get(&self, index: usize) -> Option<&GateDescriptor> {
        self.gates.get(index)
    }

    /// Remove every gate
    pub fn clear(&mut self) {
        self.gates.clear();
    }

    /// Append a gate
    ///
    /// # Errors
    /// Returns [`ValidationError::QubitOutOfRange`] if the gate touches a
    /// qubit outside the circuit.
    pub fn push(&mut self, gate: GateDescriptor) -> Result<&mut Self> {
        if let Some(&qubit) = gate
            .targets()
            .iter()
            .chain(gate.controls())
            .find(|&&q| q >= self.num_qubits)
        {
            return Err(ValidationError::qubit_out_of_range(qubit, self.num_qubits).into());
        }
        self.gates.push(gate);
        Ok(self)
    }

    /// Hadamard on `target`
    pub fn h(&mut self, target: usize) -> Result<&mut Self> {
        self.push(standard::hadamard(target))
    }

    /// Pauli-X (NOT) on `target`
    pub fn x(&mut self, target: usize) -> Result<&mut Self> {
        self.push(standard::pauli_x(target))
    }

    /// Pauli-Y on `target`
    pub fn y(&mut self, target: usize) -> Result<&mut Self> {
        self.push(standard::pauli_y(target))
    }

    /// Pauli-Z on `target`
    pub fn z(&mut self, target: usize) -> Result<&mut Self> {
        self.push(standard::pauli_z(target))
    }

    /// S gate (√Z)
    pub fn s(&mut self, target: usize) -> Result<&mut Self> {
        self.push(standard::s(target))
    }

    /// S† gate
    pub fn sdg(&mut self, target: usize) -> Result<&mut Self> {
        self.push(standard::sdg(target))
    }

    /// T gate (fourth root of Z)
    pub fn t(&mut self, target: usize) -> Result<&mut Self> {
        self.push(standard::t(target))
    }

    /// T† gate
    pub fn tdg(&mut self, target: usize) -> Result<&mut Self> {
        self.push(standard::tdg(target))
    }

    /// √X
    pub fn v(&mut self, target: usize) -> Result<&mut Self> {
        self.push(standard::v(target))
    }

    /// V† (inverse √X)
    pub fn vdg(&mut self, target: usize) -> Result<&mut Self> {
        self.push(standard::vdg(target))
    }

    /// Phase shift diag(1, e^{iθ})
    pub fn phase(&mut self, target: usize, theta: f64) -> Result<&mut Self> {
        self.push(standard::phase(target, theta)?)
    }

    /// Rotation about X by `theta`
    pub fn rx(&mut self, target: usize, theta: f64) -> Result<&mut Self> {
        self.push(standard::rx(target, theta)?)
    }

    /// Rotation about Y by `theta`
    pub fn ry(&mut self, target: usize, theta: f64) -> Result<&mut Self> {
        self.push(standard::ry(target, theta)?)
    }

    /// Rotation about Z by `theta`
    pub fn rz(&mut self, target: usize, theta: f64) -> Result<&mut Self> {
        self.push(standard::rz(target, theta)?)
    }

    /// Controlled-NOT
    pub fn cx(&mut self, control: usize, target: usize) -> Result<&mut Self> {
        self.push(standard::cnot(control, target)?)
    }

    /// Controlled-Y
    pub fn cy(&mut self, control: usize, target: usize) -> Result<&mut Self> {
        self.push(standard::cy(control, target)?)
    }

    /// Controlled-Z
    pub fn cz(&mut self, control: usize, target: usize) -> Result<&mut Self> {
        self.push(standard::cz(control, target)?)
    }

    /// Controlled-Hadamard
    pub fn ch(&mut self, control: usize, target: usize) -> Result<&mut Self> {
        self.push(standard::ch(control, target)?)
    }

    /// Controlled phase shift by `theta`
    pub fn cphase(&mut self, control: usize, target: usize, theta: f64) -> Result<&mut Self> {
        self.push(standard::cphase(control, target, theta)?)
    }

    /// Controlled X rotation
    pub fn crx(&mut self, control: usize, target: usize, theta: f64) -> Result<&mut Self> {
        self.push(standard::crx(control, target, theta)?)
    }

    /// Controlled Y rotation
    pub fn cry(&mut self, control: usize, target: usize, theta: f64) -> Result<&mut Self> {
        self.push(standard::cry(control, target, theta)?)
    }

    /// Controlled Z rotation
    pub fn crz(&mut self, control: usize, target: usize, theta: f64) -> Result<&mut Self> {
        self.push(standard::crz(control, target, theta)?)
    }

    /// Exchange two qubits
    pub fn swap(&mut self, qubit1: usize, qubit2: usize) -> Result<&mut Self> {
        self.push(standard::swap(qubit1, qubit2)?)
    }

    /// Fredkin gate: swap `qubit1` and `qubit2` when `control` is 1
    pub fn cswap(&mut self, control: usize, qubit1: usize, qubit2: usize) -> Result<&mut Self> {
        self.push(standard::cswap(control, qubit1, qubit2)?)
    }

    /// Toffoli (CCX)
    pub fn toffoli(&mut self, control1: usize, control2: usize, target: usize) -> Result<&mut Self> {
        self.push(standard::toffoli(control1, control2, target)?)
    }

    /// X on `target` when every qubit in `controls` is 1
    pub fn mcx(&mut self, controls: &[usize], target: usize) -> Result<&mut Self> {
        self.push(standard::mcx(controls, target)?)
    }

    /// Arbitrary matrix on `targets`, conditioned on `controls`
    ///
    /// Unitarity is checked when the circuit runs.
    pub fn unitary(&mut self, matrix: GateMatrix, targets: &[usize], controls: &[usize]) -> Result<&mut Self> {
        self.push(standard::unitary(matrix, targets, controls)?)
    }

    /// Apply `gate` only where every qubit in `zero_controls` reads 0
    ///
    /// Recorded as X on each zero-control, the gate controlled by them, then
    /// X again.
    pub fn controlled_by_zero(&mut self, zero_controls: &[usize], gate: &GateDescriptor) -> Result<&mut Self> {
        let mut staged = Circuit::new(self.num_qubits);
        for &q in zero_controls {
            staged.x(q)?;
        }
        staged.push(gate.controlled_by(zero_controls)?)?;
        for &q in zero_controls {
            staged.x(q)?;
        }
        self.append(&staged, 0)
    }

    /// Quantum Fourier transform over `qubits`
    ///
    /// `qubits[0]` is the least significant bit of the transformed register.
    /// Without `with_swaps` the output is left in bit-reversed order.
    pub fn qft(&mut self, qubits: &[usize], with_swaps: bool) -> Result<&mut Self> {
        let mut staged = Circuit::new(self.num_qubits);
        for j in (0..qubits.len()).rev() {
            staged.h(qubits[j])?;
            for k in (0..j).rev() {
                let angle = PI / 2f64.powi((j - k) as i32);
                staged.cphase(qubits[k], qubits[j], angle)?;
            }
        }
        if with_swaps {
            for i in 0..qubits.len() / 2 {
                staged.swap(qubits[i], qubits[qubits.len() - 1 - i])?;
            }
        }
        self.append(&staged, 0)
    }

    /// Inverse of [`Circuit::qft`] with the same arguments
    pub fn inverse_qft(&mut self, qubits: &[usize], with_swaps: bool) -> Result<&mut Self> {
        let mut forward = Circuit::new(self.num_qubits);
        forward.qft(qubits, with_swaps)?;
        self.append(&forward.inverse(), 0)
    }

    /// Circuit that undoes this one: reversed order, adjoint gates
    pub fn inverse(&self) -> Circuit {
        Circuit {
            num_qubits: self.num_qubits,
            gates: self.gates.iter().rev().map(GateDescriptor::adjoint).collect(),
        }
    }

    /// Copy of this circuit with `controls` added to every gate
    ///
    /// The result acts as this circuit where every control reads 1 and as
    /// the identity elsewhere.
    ///
    /// # Errors
    /// Fails if a control is out of range, repeated, or already used by a
    /// gate.
    pub fn controlled_by(&self, controls: &[usize]) -> Result<Circuit> {
        let mut controlled = Circuit::new(self.num_qubits);
        for gate in &self.gates {
            controlled.push(gate.controlled_by(controls)?)?;
        }
        Ok(controlled)
    }

    /// Append `other` with every qubit index shifted by `offset`
    ///
    /// # Errors
    /// Fails without modifying `self` if any shifted qubit falls outside
    /// this circuit.
    pub fn append(&mut self, other: &Circuit, offset: usize) -> Result<&mut Self> {
        let widest = other.gates.iter().map(GateDescriptor::min_register_size).max().unwrap_or(0);
        if widest > 0 && widest + offset > self.num_qubits {
            return Err(ValidationError::qubit_out_of_range(widest + offset - 1, self.num_qubits).into());
        }
        self.gates.extend(other.gates.iter().map(|gate| gate.offset(offset)));
        Ok(self)
    }

    /// Apply every gate to `buffer` through `bridge`
    ///
    /// Every gate is validated against the buffer before the first one is
    /// applied, so a bad gate anywhere in the circuit leaves the buffer
    /// untouched.
    pub fn run(&self, bridge: &DispatchBridge, buffer: &mut AmplitudeBuffer) -> Result<()> {
        let num_qubits = buffer.num_qubits();
        let plans = self
            .gates
            .iter()
            .map(|gate| bridge.plan(gate, num_qubits))
            .collect::<Result<Vec<_>>>()?;

        debug!(
            gates = self.gates.len(),
            qubits = buffer.num_qubits(),
            backend = bridge.backend_name(),
            "run circuit"
        );
        for plan in &plans {
            bridge.apply_plan(buffer, plan)?;
        }
        Ok(())
    }

    /// Allocate a fresh |0...0⟩ state and run the circuit on it
    pub fn execute(&self, bridge: &DispatchBridge) -> Result<AmplitudeBuffer> {
        let mut state = bridge.create_state(self.num_qubits)?;
        self.run(bridge, &mut state)?;
        Ok(state)
    }
}

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Circuit({} qubits, {} gates)", self.num_qubits, self.len())?;
        for (i, gate) in self.gates.iter().enumerate() {
            writeln!(f, "  {}: {}", i, gate)?;
        }
        Ok(())
    }
}
