//! Quantum Fourier transform of a basis state
//!
//! Usage: `cargo run --example qft -- [num_qubits] [input]`

use qsv::prelude::*;
use qsv::{measurement, QsvError, ValidationError};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

fn parse_arg(arg: Option<String>, name: &'static str, default: usize) -> Result<usize> {
    match arg {
        None => Ok(default),
        Some(text) => text.parse().map_err(|_| {
            QsvError::from(ValidationError::InvalidParameter {
                name,
                value: text,
            })
        }),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let num_qubits = parse_arg(args.next(), "num_qubits", 4)?;
    let input = parse_arg(args.next(), "input", 1)?;

    let bridge = DispatchBridge::new(KernelConfig::default())?;
    let qubits: Vec<usize> = (0..num_qubits).collect();

    let mut circuit = Circuit::new(num_qubits);
    for &q in &qubits {
        if (input >> q) & 1 == 1 {
            circuit.x(q)?;
        }
    }
    circuit.qft(&qubits, true)?;

    let start = Instant::now();
    let mut state = circuit.execute(&bridge)?;
    let forward = start.elapsed();

    println!("QFT of |{}⟩ on {} qubits ({} gates, {:?})", input, num_qubits, circuit.len(), forward);
    let shown = state.dimension().min(16);
    for (y, amplitude) in state.amplitudes().iter().take(shown).enumerate() {
        println!("  y={:<4} |a|={:.4}  phase={:+.4}", y, amplitude.norm(), amplitude.arg());
    }

    let mut undo = Circuit::new(num_qubits);
    undo.inverse_qft(&qubits, true)?;
    undo.run(&bridge, &mut state)?;

    let recovered = measurement::probabilities(&state, &qubits)?
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(outcome, _)| outcome.bits);
    println!("Inverse QFT recovers: {:?}", recovered);
    println!("Norm report: {:?}", bridge.check_norm(&state)?);

    Ok(())
}
