//! Behavioral properties of the clustering engine on synthetic data.

use pattern_learner::cluster::{KMeansClusterer, assign_to_nearest_centroid};
use pattern_learner::patterns::{
    Domain, LabelRules, LabelingInput, PatternLabeler, distances_to_retained,
};
use pattern_learner::{evaluate, inertia};
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Three tight groups of five points around (0,0), (10,10) and (-10,10).
fn three_blobs() -> Vec<Vec<f32>> {
    let centers = [(0.0, 0.0), (10.0, 10.0), (-10.0, 10.0)];
    let offsets = [(0.0, 0.0), (0.3, 0.1), (-0.2, 0.3), (0.1, -0.3), (-0.3, -0.2)];
    centers
        .iter()
        .flat_map(|&(cx, cy)| offsets.iter().map(move |&(dx, dy)| vec![cx + dx, cy + dy]))
        .collect()
}

#[test]
fn test_blobs_recovered_across_seeds() {
    let vectors = three_blobs();

    for seed in 0..5 {
        let mut rng = StdRng::seed_from_u64(seed);
        let result = KMeansClusterer::new(3).cluster(&vectors, &mut rng);

        assert!(result.converged, "seed {seed} did not converge");
        for group in 0..3 {
            let label = result.assignments[group * 5];
            assert!(
                result.assignments[group * 5..group * 5 + 5]
                    .iter()
                    .all(|&a| a == label),
                "seed {seed}: blob {group} was split"
            );
        }

        let quality = evaluate(&vectors, &result.assignments, &result.centroids);
        assert_eq!(quality.clusters, 3);
        assert!(quality.silhouette > 0.8);
        assert!(quality.inertia < 2.0);
    }
}

#[test]
fn test_converged_points_sit_with_nearest_centroid() {
    let vectors = three_blobs();
    let mut rng = StdRng::seed_from_u64(99);
    let result = KMeansClusterer::new(3).cluster(&vectors, &mut rng);

    for (vector, &assigned) in vectors.iter().zip(&result.assignments) {
        assert_eq!(assign_to_nearest_centroid(vector, &result.centroids), assigned);
    }
    assert_eq!(
        inertia(&vectors, &result.assignments, &result.centroids),
        evaluate(&vectors, &result.assignments, &result.centroids).inertia
    );
}

#[test]
fn test_degenerate_inputs_yield_empty_results() {
    let mut rng = StdRng::seed_from_u64(0);
    let vectors = three_blobs();

    assert!(KMeansClusterer::new(3).cluster(&[], &mut rng).is_empty());
    assert!(KMeansClusterer::new(0).cluster(&vectors, &mut rng).is_empty());
    assert!(KMeansClusterer::new(16).cluster(&vectors, &mut rng).is_empty());

    let ragged = vec![vec![0.0, 1.0], vec![1.0]];
    assert!(KMeansClusterer::new(1).cluster(&ragged, &mut rng).is_empty());
}

#[test]
fn test_same_seed_same_result() {
    let vectors = three_blobs();
    let first = KMeansClusterer::new(3).cluster(&vectors, &mut StdRng::seed_from_u64(5));
    let second = KMeansClusterer::new(3).cluster(&vectors, &mut StdRng::seed_from_u64(5));
    assert_eq!(first, second);
}

#[test]
fn test_outlier_reported_as_anomaly() {
    let mut vectors: Vec<Vec<f32>> = (0..20)
        .map(|i| vec![(i % 5) as f32 * 0.1, (i / 5) as f32 * 0.1])
        .collect();
    vectors.push(vec![25.0, 25.0]);
    let outlier = vectors.len() - 1;

    let mut rng = StdRng::seed_from_u64(1);
    let clustering = KMeansClusterer::new(1).cluster(&vectors, &mut rng);

    let names = vec!["x".to_string(), "y".to_string()];
    let patterns = PatternLabeler::new(LabelRules::default(), 2).label(&LabelingInput {
        vectors: &vectors,
        raw: &vectors,
        feature_names: &names,
        clustering: &clustering,
        domain: Domain::Code,
    });

    assert_eq!(patterns.len(), 2);
    let cluster = &patterns[0];
    assert_eq!(cluster.size, 21);
    assert!((cluster.support - 1.0).abs() < 1e-6);
    assert!(cluster.confidence > 0.0 && cluster.confidence <= 1.0);
    assert!(cluster.examples.len() <= 5);
    assert!(!cluster.examples.contains(&outlier));

    let anomaly = patterns.last().unwrap();
    assert!(anomaly.is_anomaly());
    // ceil(21 * 0.05) = 2
    assert_eq!(anomaly.size, 2);
    assert_eq!(anomaly.members[0], outlier);
}

#[test]
fn test_isolated_outlier_reported_with_two_clusters() {
    let mut vectors: Vec<Vec<f32>> = (0..9)
        .map(|i| vec![(i % 3) as f32 * 0.1, (i / 3) as f32 * 0.1])
        .collect();
    vectors.push(vec![100.0, 100.0]);
    let outlier = vectors.len() - 1;
    let names = vec!["x".to_string(), "y".to_string()];

    for seed in 0..20 {
        let mut rng = StdRng::seed_from_u64(seed);
        let clustering = KMeansClusterer::new(2).cluster(&vectors, &mut rng);
        // The far point ends up alone in its own cluster
        assert_eq!(clustering.members().iter().filter(|m| m.len() == 1).count(), 1);

        let patterns = PatternLabeler::new(LabelRules::default(), 2).label(&LabelingInput {
            vectors: &vectors,
            raw: &vectors,
            feature_names: &names,
            clustering: &clustering,
            domain: Domain::Code,
        });

        // Only the nine-point cluster is kept
        assert_eq!(patterns.len(), 2);
        assert_eq!(patterns[0].size, 9);
        let anomaly = patterns.last().unwrap();
        assert!(anomaly.is_anomaly());
        assert_eq!(anomaly.members, vec![outlier], "seed {seed}");

        // Above the 95th percentile of distances to the kept clusters
        let kept: Vec<usize> = clustering
            .members()
            .iter()
            .enumerate()
            .filter(|(_, m)| m.len() >= 2)
            .map(|(id, _)| id)
            .collect();
        let mut distances = distances_to_retained(&vectors, &clustering, &kept);
        let far = distances[outlier];
        distances.sort_by(f32::total_cmp);
        let p95 = distances[(0.95 * (distances.len() - 1) as f32).floor() as usize];
        assert!(far >= p95);
        assert!(far > distances[distances.len() - 2]);
    }
}
