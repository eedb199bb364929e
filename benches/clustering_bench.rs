//! Clustering performance benchmarks
//!
//! Measures K-means (seeding plus Lloyd iterations) and silhouette scoring
//! on synthetic blob data of increasing size.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use pattern_learner::{KMeansClusterer, silhouette};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::hint::black_box;

const DIMENSION: usize = 12;
const CLUSTERS: usize = 5;

/// Points scattered around `CLUSTERS` well separated centers.
fn blobs(n: usize, seed: u64) -> Vec<Vec<f32>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|i| {
            let center = (i % CLUSTERS) as f32 * 10.0;
            (0..DIMENSION)
                .map(|_| center + rng.random_range(-1.0..1.0))
                .collect()
        })
        .collect()
}

fn bench_kmeans(c: &mut Criterion) {
    let mut group = c.benchmark_group("kmeans");

    for n in [100, 1_000, 5_000] {
        let vectors = blobs(n, 42);
        group.throughput(Throughput::Elements(n as u64));

        group.bench_with_input(BenchmarkId::new("cluster", n), &vectors, |b, vectors| {
            let clusterer = KMeansClusterer::new(CLUSTERS);
            b.iter(|| {
                let mut rng = StdRng::seed_from_u64(7);
                black_box(clusterer.cluster(black_box(vectors), &mut rng))
            });
        });
    }

    group.finish();
}

fn bench_silhouette(c: &mut Criterion) {
    let mut group = c.benchmark_group("silhouette");

    for n in [100, 1_000] {
        let vectors = blobs(n, 42);
        let mut rng = StdRng::seed_from_u64(7);
        let result = KMeansClusterer::new(CLUSTERS).cluster(&vectors, &mut rng);
        group.throughput(Throughput::Elements(n as u64));

        group.bench_with_input(
            BenchmarkId::new("score", n),
            &(vectors, result.assignments),
            |b, (vectors, assignments)| {
                b.iter(|| black_box(silhouette(black_box(vectors), black_box(assignments))));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_kmeans, bench_silhouette);
criterion_main!(benches);
