use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use shoal_core::CancelToken;
use shoal_core::geom::{Point, point};
use shoal_layout::cluster::{ClusterTarget, ClusteringOptions, Linkage, assign_by_proximity};
use std::hint::black_box;

fn scatter_positions(n: usize) -> Vec<Point> {
    // Deterministic jittered grid; no RNG so runs are comparable.
    (0..n)
        .map(|i| {
            let x = (i % 16) as f64 * 17.0 + (i as f64 * 0.37).sin() * 5.0;
            let y = (i / 16) as f64 * 23.0 + (i as f64 * 0.61).cos() * 5.0;
            point(x, y)
        })
        .collect()
}

fn bench_proximity_clustering(c: &mut Criterion) {
    let mut group = c.benchmark_group("assign_by_proximity");
    for &n in &[64usize, 256] {
        let positions = scatter_positions(n);
        for linkage in [Linkage::Single, Linkage::Upgma] {
            group.bench_function(BenchmarkId::new(format!("{linkage:?}").to_lowercase(), n), |b| {
                let options = ClusteringOptions::new(linkage, ClusterTarget::Count(n / 8));
                let cancel = CancelToken::new();
                b.iter(|| assign_by_proximity(black_box(&positions), &options, &cancel).unwrap());
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_proximity_clustering);
criterion_main!(benches);
