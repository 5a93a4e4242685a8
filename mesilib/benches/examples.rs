use std::fs::File;
use std::io::Read;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use mesilib::config::SimulatorConfig;
use mesilib::simulator::Simulator;
use mesilib::util::get_cases;

/// Builds a trace cycling over a handful of blocks, so both processors keep stealing lines
fn synthetic_trace(requests: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(requests * 13);
    for i in 0..requests {
        let op = if i % 3 == 0 { '1' } else { '0' };
        out.extend_from_slice(format!("# {op} 0000{:04x}\n", (i * 7919) % 512).as_bytes());
    }
    out
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("Examples");
    let config = SimulatorConfig::default();

    get_cases()
        .unwrap()
        .iter()
        .for_each(|case| {
            let mut trace_file = File::open(&case.trace).unwrap();
            let mut buf = Vec::new();
            // Ignoring IO, the fixtures are tiny
            trace_file.read_to_end(&mut buf).unwrap();
            group.bench_with_input(BenchmarkId::new("Fixture", &case.name), &buf, |bench, buf| {
                bench.iter(|| {
                    Simulator::new(&config).unwrap().simulate(buf).unwrap().requests
                });
            });
        });

    let synthetic = synthetic_trace(100_000);
    group.throughput(Throughput::Bytes(synthetic.len() as u64));
    group.bench_with_input(BenchmarkId::new("Synthetic", 100_000), &synthetic, |bench, buf| {
        bench.iter(|| {
            Simulator::new(&config).unwrap().simulate(buf).unwrap().requests
        });
    });
    group.finish();
}

criterion_group!(
    name = benches;
    config = Criterion::default().significance_level(0.1).sample_size(10);
    targets = criterion_benchmark
);
criterion_main!(benches);
