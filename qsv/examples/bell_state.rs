//! Prepare a Bell pair and sample it
//!
//! Run with `RUST_LOG=qsv_backend=debug` to see backend selection.

use qsv::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("Bell State");
    println!("==========");

    let bridge = DispatchBridge::new(KernelConfig::default())?;
    println!("Backend: {} ({})", bridge.backend_name(), bridge.backend_status());

    let mut circuit = Circuit::new(2);
    circuit.h(0)?.cx(0, 1)?;
    print!("{}", circuit);

    let state = circuit.execute(&bridge)?;
    println!("\nAmplitudes:");
    for (index, amplitude) in state.amplitudes().iter().enumerate() {
        println!("  |{:02b}⟩  {:+.4} {:+.4}i", index, amplitude.re, amplitude.im);
    }

    let mut rng = StdRng::seed_from_u64(42);
    let counts = bridge.sample_counts(&state, &[0, 1], 1000, &mut rng)?;
    println!("\n{:<10} | {:<8} | {:<8}", "Outcome", "Count", "Freq");
    println!("{:-<10}-+-{:-<8}-+-{:-<8}", "", "", "");
    for (bits, count) in counts.sorted_outcomes() {
        println!("{:<10} | {:<8} | {:.3}", Outcome::new(bits, 2), count, counts.get_frequency(bits));
    }

    Ok(())
}
