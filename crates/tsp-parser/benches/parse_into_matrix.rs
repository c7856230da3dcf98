use criterion::{Criterion, criterion_group, criterion_main};
use std::io::Write;
use tsp_parser::random_euclidean_instance;

fn write_euc_2d_tsplib(node_count: usize, grid: u32) -> tempfile::NamedTempFile {
    let instance = random_euclidean_instance(1, node_count, grid);
    let coords = instance.metadata().coords.as_ref().unwrap();

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "NAME: bench{node_count}").unwrap();
    writeln!(file, "TYPE: TSP").unwrap();
    writeln!(file, "DIMENSION: {node_count}").unwrap();
    writeln!(file, "EDGE_WEIGHT_TYPE: EUC_2D").unwrap();
    writeln!(file, "NODE_COORD_SECTION").unwrap();
    for (i, (x, y)) in coords.iter().enumerate() {
        writeln!(file, "{} {} {}", i + 1, x, y).unwrap();
    }
    writeln!(file, "EOF").unwrap();
    file
}

fn bench_parse_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_into_matrix");
    for &n in &[100usize, 500, 1000] {
        let file = write_euc_2d_tsplib(n, 100_000);
        group.bench_function(format!("parse EUC_2D n={n}"), |b| {
            b.iter(|| tsp_parser::parse_instance(file.path()).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_parse_sizes);
criterion_main!(benches);
