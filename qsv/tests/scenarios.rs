//! End-to-end tests through the public facade

use approx::assert_relative_eq;
use num_complex::Complex64;
use proptest::prelude::*;
use qsv::prelude::*;
use qsv::{measurement, BackendPreference, ErrorKind, ValidationError};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::f64::consts::{FRAC_1_SQRT_2, PI};

const EPSILON: f64 = 1e-10;

fn bridges() -> Vec<DispatchBridge> {
    vec![
        DispatchBridge::new(KernelConfig::reference()).unwrap(),
        DispatchBridge::new(KernelConfig::always_parallel().with_worker_threads(2)).unwrap(),
    ]
}

fn assert_state_eq(actual: &AmplitudeBuffer, expected: &[Complex64]) {
    assert_eq!(actual.dimension(), expected.len());
    for (i, (a, e)) in actual.amplitudes().iter().zip(expected).enumerate() {
        assert!((a - e).norm() < EPSILON, "amplitude {}: got {}, expected {}", i, a, e);
    }
}

fn c(re: f64) -> Complex64 {
    Complex64::new(re, 0.0)
}

#[test]
fn test_fresh_state_then_hadamard() {
    for bridge in bridges() {
        let mut state = bridge.create_state(2).unwrap();
        assert_state_eq(&state, &[c(1.0), c(0.0), c(0.0), c(0.0)]);

        bridge.apply_gate(&mut state, &standard::hadamard(0)).unwrap();
        assert_state_eq(&state, &[c(FRAC_1_SQRT_2), c(FRAC_1_SQRT_2), c(0.0), c(0.0)]);
    }
}

#[test]
fn test_bell_state_amplitudes() {
    for bridge in bridges() {
        let mut circuit = Circuit::new(2);
        circuit.h(0).unwrap().cx(0, 1).unwrap();

        let state = circuit.execute(&bridge).unwrap();
        assert_state_eq(&state, &[c(FRAC_1_SQRT_2), c(0.0), c(0.0), c(FRAC_1_SQRT_2)]);
    }
}

#[test]
fn test_bell_sampling_frequencies() {
    let bridge = DispatchBridge::new(KernelConfig::default()).unwrap();
    let mut circuit = Circuit::new(2);
    circuit.h(0).unwrap().cx(0, 1).unwrap();

    let mut rng = StdRng::seed_from_u64(2024);
    let mut counts = std::collections::HashMap::new();
    for _ in 0..1000 {
        let mut state = circuit.execute(&bridge).unwrap();
        let shot = bridge.sample(&mut state, &[0, 1], true, &mut rng).unwrap();
        *counts.entry(shot.outcome.to_bitstring()).or_insert(0usize) += 1;
    }

    assert_eq!(counts.get("01"), None);
    assert_eq!(counts.get("10"), None);
    let zeros = counts.get("00").copied().unwrap_or(0) as i64;
    let ones = counts.get("11").copied().unwrap_or(0) as i64;
    assert_eq!(zeros + ones, 1000);
    assert!((zeros - 500).abs() < 80, "counts = {:?}", counts);
}

#[test]
fn test_double_x_is_identity() {
    for bridge in bridges() {
        let mut state = bridge.create_state(2).unwrap();
        bridge.apply_gate(&mut state, &standard::pauli_x(0)).unwrap();
        assert_state_eq(&state, &[c(0.0), c(1.0), c(0.0), c(0.0)]);
        bridge.apply_gate(&mut state, &standard::pauli_x(0)).unwrap();
        assert_state_eq(&state, &[c(1.0), c(0.0), c(0.0), c(0.0)]);
    }
}

#[test]
fn test_shear_matrix_rejected() {
    for bridge in bridges() {
        let mut state = bridge.create_state(2).unwrap();
        bridge.apply_gate(&mut state, &standard::hadamard(1)).unwrap();
        let before = state.amplitudes().to_vec();

        let shear = GateMatrix::new(2, vec![c(1.0), c(1.0), c(0.0), c(1.0)]).unwrap();
        let err = bridge.apply(&mut state, &[0], &[], shear).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(matches!(err, QsvError::Validation(ValidationError::NotUnitary { .. })));
        assert_eq!(state.amplitudes(), before.as_slice());
    }
}

#[test]
fn test_qft_of_basis_state() {
    for bridge in bridges() {
        let mut circuit = Circuit::new(3);
        circuit.x(0).unwrap().qft(&[0, 1, 2], true).unwrap();
        let state = circuit.execute(&bridge).unwrap();

        let scale = 1.0 / 8f64.sqrt();
        let expected: Vec<Complex64> = (0..8)
            .map(|y| Complex64::from_polar(scale, 2.0 * PI * y as f64 / 8.0))
            .collect();
        assert_state_eq(&state, &expected);
    }
}

#[test]
fn test_qft_then_inverse_restores_state() {
    let bridge = DispatchBridge::new(KernelConfig::default()).unwrap();
    let mut prep = Circuit::new(4);
    prep.ry(0, 0.3).unwrap().rx(2, 1.1).unwrap().cx(2, 3).unwrap().t(1).unwrap();
    let expected = prep.execute(&bridge).unwrap();

    let qubits = [0, 1, 2, 3];
    let mut circuit = prep.clone();
    circuit.qft(&qubits, true).unwrap().inverse_qft(&qubits, true).unwrap();
    let actual = circuit.execute(&bridge).unwrap();

    assert_state_eq(&actual, expected.amplitudes());
}

#[test]
fn test_circuit_inverse_round_trip() {
    let bridge = DispatchBridge::new(KernelConfig::reference()).unwrap();
    let mut circuit = Circuit::new(3);
    circuit
        .h(0)
        .unwrap()
        .s(1)
        .unwrap()
        .cphase(0, 2, 0.7)
        .unwrap()
        .toffoli(0, 1, 2)
        .unwrap()
        .rz(1, -0.4)
        .unwrap();

    let mut state = circuit.execute(&bridge).unwrap();
    circuit.inverse().run(&bridge, &mut state).unwrap();
    assert_state_eq(&state, &[c(1.0), c(0.0), c(0.0), c(0.0), c(0.0), c(0.0), c(0.0), c(0.0)]);
}

#[test]
fn test_controlled_by_zero_fires_on_zero() {
    let bridge = DispatchBridge::new(KernelConfig::reference()).unwrap();

    // control reads 0, so the target flips
    let mut circuit = Circuit::new(2);
    circuit.controlled_by_zero(&[0], &standard::pauli_x(1)).unwrap();
    let state = circuit.execute(&bridge).unwrap();
    assert_state_eq(&state, &[c(0.0), c(0.0), c(1.0), c(0.0)]);

    // control reads 1, nothing happens
    let mut circuit = Circuit::new(2);
    circuit.x(0).unwrap();
    circuit.controlled_by_zero(&[0], &standard::pauli_x(1)).unwrap();
    let state = circuit.execute(&bridge).unwrap();
    assert_state_eq(&state, &[c(0.0), c(1.0), c(0.0), c(0.0)]);
}

#[test]
fn test_bad_gate_anywhere_leaves_state_untouched() {
    let bridge = DispatchBridge::new(KernelConfig::reference()).unwrap();
    let mut state = bridge.create_state(2).unwrap();

    let mut circuit = Circuit::new(2);
    circuit.h(0).unwrap();
    circuit
        .unitary(GateMatrix::new(2, vec![c(2.0), c(0.0), c(0.0), c(1.0)]).unwrap(), &[1], &[])
        .unwrap();

    assert!(circuit.run(&bridge, &mut state).is_err());
    assert_state_eq(&state, &[c(1.0), c(0.0), c(0.0), c(0.0)]);
}

#[test]
fn test_expectation_values() {
    let bridge = DispatchBridge::new(KernelConfig::default()).unwrap();
    let mut circuit = Circuit::new(2);
    circuit.ry(1, PI / 3.0).unwrap();
    let state = circuit.execute(&bridge).unwrap();

    // cos(θ) for Ry(θ)|0⟩
    assert_relative_eq!(measurement::pauli_z_expectation(&state, 1).unwrap(), 0.5, epsilon = EPSILON);
    assert_relative_eq!(measurement::pauli_z_expectation(&state, 0).unwrap(), 1.0, epsilon = EPSILON);
    assert_relative_eq!(measurement::probability_of(&state, 1, true).unwrap(), 0.25, epsilon = EPSILON);
    assert!(measurement::probability_of(&state, 2, true).is_err());
}

#[test]
fn test_reference_preference_reported() {
    let bridge = DispatchBridge::new(KernelConfig::default().with_backend(BackendPreference::ReferenceOnly)).unwrap();
    assert_eq!(bridge.backend_status(), BackendStatus::Reference);
    assert!(!bridge.is_degraded());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_random_circuit_preserves_norm(
        ops in prop::collection::vec((0u8..5, 0usize..5, 1usize..5, -PI..PI), 1..20),
    ) {
        let bridge = DispatchBridge::new(KernelConfig::always_parallel()).unwrap();
        let mut circuit = Circuit::new(5);
        for (kind, a, shift, theta) in ops {
            let b = (a + shift) % 5;
            match kind {
                0 => circuit.h(a).unwrap(),
                1 => circuit.rx(a, theta).unwrap(),
                2 => circuit.cx(a, b).unwrap(),
                3 => circuit.cphase(a, b, theta).unwrap(),
                _ => circuit.swap(a, b).unwrap(),
            };
        }

        let state = circuit.execute(&bridge).unwrap();
        prop_assert!(bridge.check_norm(&state).is_ok());
        prop_assert!((state.norm() - 1.0).abs() < EPSILON);
    }
}
