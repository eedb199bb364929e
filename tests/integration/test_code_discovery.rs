//! End-to-end discovery over a small source tree on disk.

use pattern_learner::parsing::collect_code_nodes;
use pattern_learner::{NodeKind, PatternLearner, Settings};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::BTreeSet;
use std::fmt::Write;
use std::fs;
use tempfile::TempDir;

/// Long, branchy, undocumented functions with six parameters.
fn heavy_source(count: usize) -> String {
    let mut code = String::new();
    for i in 0..count {
        writeln!(
            code,
            "fn heavy_{i}(a: i32, b: i32, c: i32, d: i32, e: i32, f: i32) -> i32 {{"
        )
        .unwrap();
        code.push_str(
            r#"    let mut total = 0;
    for x in 0..a {
        if x > b {
            while total < c {
                if d > e && e > f {
                    total += 1;
                } else {
                    total -= 1;
                }
            }
        }
    }
    if a == b || c == d {
        total += 1;
    }
    let bonus = match a {
        0 => 1,
        1 => 2,
        2 => 3,
        _ => 4,
    };
"#,
        );
        for j in 0..40 {
            writeln!(code, "    total += {j};").unwrap();
        }
        code.push_str("    total + bonus\n}\n\n");
    }
    code
}

/// One-line documented helpers.
fn tiny_source(count: usize) -> String {
    let mut code = String::new();
    for i in 0..count {
        writeln!(code, "/// Returns its input.\nfn tiny_{i}(x: u8) -> u8 {{ x }}\n").unwrap();
    }
    code
}

fn settings_with_k(k: usize) -> Settings {
    let mut settings = Settings::default();
    settings.clustering.k = Some(k);
    settings.discovery.parallel_threads = 2;
    settings
}

#[test]
fn test_source_tree_splits_into_shapes() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("heavy.rs"), heavy_source(5)).unwrap();
    fs::write(temp_dir.path().join("tiny.rs"), tiny_source(5)).unwrap();

    let settings = settings_with_k(2);
    let collection = collect_code_nodes(temp_dir.path(), &settings.discovery).unwrap();
    assert_eq!(collection.files, 2);
    assert_eq!(collection.nodes.len(), 10);
    assert!(collection.nodes.iter().all(|n| n.kind == NodeKind::Function));

    let heavy = &collection.nodes[0];
    assert_eq!(heavy.parameter_count, 6);
    assert_eq!(heavy.nesting_depth, 4);
    assert!(!heavy.has_doc);
    assert!(collection.nodes[9].has_doc);

    let learner = PatternLearner::new(settings);
    let mut rng = StdRng::seed_from_u64(21);
    let report = learner.discover_code(&collection.nodes, &mut rng);

    assert_eq!(report.entity_count, 10);
    let clusters: Vec<_> = report.cluster_patterns().collect();
    assert_eq!(clusters.len(), 2);

    let groups: BTreeSet<BTreeSet<usize>> = clusters
        .iter()
        .map(|p| p.members.iter().copied().collect())
        .collect();
    let expected: BTreeSet<BTreeSet<usize>> =
        BTreeSet::from([(0..5).collect(), (5..10).collect()]);
    assert_eq!(groups, expected);

    let heavy_pattern = clusters.iter().find(|p| p.members.contains(&0)).unwrap();
    assert_eq!(heavy_pattern.name, "High-complexity functions");
    assert_eq!(heavy_pattern.category, "complexity");

    let tiny_pattern = clusters.iter().find(|p| p.members.contains(&9)).unwrap();
    assert_eq!(tiny_pattern.name, "Small documented helpers");

    assert!(report.anomaly().is_some());
}

#[test]
fn test_mixed_languages_are_collected() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("app.py"),
        "class App:\n    def run(self):\n        return 1\n",
    )
    .unwrap();
    fs::write(temp_dir.path().join("lib.rs"), "pub struct App;\n").unwrap();
    fs::write(temp_dir.path().join("notes.txt"), "not code").unwrap();

    let settings = settings_with_k(2);
    let collection = collect_code_nodes(temp_dir.path(), &settings.discovery).unwrap();

    let kinds: Vec<NodeKind> = collection.nodes.iter().map(|n| n.kind).collect();
    assert_eq!(kinds, vec![NodeKind::Class, NodeKind::Method, NodeKind::Struct]);
}

#[test]
fn test_report_serializes_to_json() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("tiny.rs"), tiny_source(4)).unwrap();

    let settings = settings_with_k(1);
    let collection = collect_code_nodes(temp_dir.path(), &settings.discovery).unwrap();
    let report =
        PatternLearner::new(settings).discover_code(&collection.nodes, &mut StdRng::seed_from_u64(0));

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["k"], 1);
    assert_eq!(json["entity_count"], 4);
    let ids: Vec<&str> = json["patterns"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["cluster-0", "anomaly"]);
}
