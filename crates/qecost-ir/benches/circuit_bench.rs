//! Benchmarks for circuit parsing and flattening
//!
//! Run with: cargo bench -p qecost-ir

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use qecost_ir::{Circuit, Gate};

/// A repetition-code memory circuit over `n` data qubits and `rounds` rounds.
fn repetition_circuit(n: u32, rounds: u64) -> Circuit {
    let ancillas: Vec<u32> = (0..n - 1).map(|i| n + i).collect();
    let mut round = Circuit::new();
    for i in 0..n - 1 {
        round.append(Gate::CX, &[i, n + i, i + 1, n + i], &[]).unwrap();
    }
    round.append(Gate::Depolarize1, &(0..2 * n - 1).collect::<Vec<_>>(), &[0.001]).unwrap();
    round.append(Gate::MR, &ancillas, &[]).unwrap();
    for k in 1..n {
        round.append_detector(&[k, k + n - 1], &[]).unwrap();
    }

    let mut circuit = Circuit::new();
    circuit.append(Gate::R, &(0..2 * n - 1).collect::<Vec<_>>(), &[]).unwrap();
    circuit.append(Gate::MR, &ancillas, &[]).unwrap();
    circuit.append_repeat(rounds, round).unwrap();
    circuit
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");

    for n in &[5u32, 15, 25] {
        let text = repetition_circuit(*n, 10).flattened().to_string();
        group.bench_with_input(BenchmarkId::new("flat_text", n), &text, |b, text| {
            b.iter(|| black_box(text.as_str()).parse::<Circuit>().unwrap());
        });
    }

    group.finish();
}

fn bench_flatten(c: &mut Criterion) {
    let mut group = c.benchmark_group("flatten");

    for rounds in &[10u64, 100, 1000] {
        let circuit = repetition_circuit(15, *rounds);
        group.bench_with_input(BenchmarkId::new("iter_flat", rounds), &circuit, |b, circuit| {
            b.iter(|| black_box(circuit).iter_flat().count());
        });
        group.bench_with_input(
            BenchmarkId::new("num_detectors", rounds),
            &circuit,
            |b, circuit| {
                b.iter(|| black_box(circuit).num_detectors());
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_parse, bench_flatten);
criterion_main!(benches);
