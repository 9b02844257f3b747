//! Version command implementation.

use console::style;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - energy cost of surface code memory experiments",
        style("qecost").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Components:");
    println!("  qecost-ir      Stabilizer circuit representation and text format");
    println!("  qecost-sim     Pauli-frame sampler and detector error models");
    println!("  qecost-codes   Rotated surface code circuit generation");
    println!("  qecost-decode  Matching and parity decoders");
    println!("  qecost-engine  Simulations, sweeps and energy accounting");
    println!();
    println!("License:    {}", style("Apache-2.0").dim());
}
