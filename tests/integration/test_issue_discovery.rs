//! End-to-end discovery over an issue export.

use pattern_learner::documents::load_documents;
use pattern_learner::{PatternLearner, Settings};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::BTreeSet;
use std::fs;
use tempfile::TempDir;

const ISSUES: &str = r#"[
    {"id": 1, "title": "Parser crash on empty file", "body": "The parser panics with a crash"},
    {"id": 2, "title": "Crash in parser", "body": "parser panic backtrace attached"},
    {"id": 3, "title": "Panic while parsing", "body": "parser crash, panic in tokenizer"},
    {"id": 4, "title": "Parser panic regression", "body": "crash again in the parser"},
    {"id": 5, "title": "Crash report", "body": "panic inside parser module"},
    {"id": 6, "title": "Search is slow", "body": "search latency grows with index size"},
    {"id": 7, "title": "Slow search results", "body": "latency of search is high"},
    {"id": 8, "title": "Search latency", "body": "slow search on large repositories"},
    {"id": 9, "title": "Latency spikes", "body": "search becomes slow under load"},
    {"id": 10, "title": "Improve search speed", "body": "search latency is slow"}
]"#;

fn load(temp_dir: &TempDir) -> Vec<pattern_learner::Document> {
    let path = temp_dir.path().join("issues.json");
    fs::write(&path, ISSUES).unwrap();
    load_documents(&path).unwrap()
}

#[test]
fn test_issues_group_by_topic() {
    let temp_dir = TempDir::new().unwrap();
    let documents = load(&temp_dir);
    assert_eq!(documents.len(), 10);
    assert_eq!(documents[9].id, "10");

    let mut settings = Settings::default();
    settings.clustering.k = Some(2);
    let learner = PatternLearner::new(settings);
    let report = learner.discover_documents(&documents, &mut StdRng::seed_from_u64(4));

    assert_eq!(report.skipped, 0);
    let clusters: Vec<_> = report.cluster_patterns().collect();
    assert_eq!(clusters.len(), 2);

    let bug = clusters.iter().find(|p| p.category == "bug").unwrap();
    let performance = clusters.iter().find(|p| p.category == "performance").unwrap();
    assert_eq!(
        bug.members.iter().copied().collect::<BTreeSet<_>>(),
        (0..5).collect()
    );
    assert_eq!(
        performance.members.iter().copied().collect::<BTreeSet<_>>(),
        (5..10).collect()
    );
    assert!(performance.name.contains("search"));
    assert!(report.quality.silhouette > 0.3);
}

#[test]
fn test_custom_keyword_categories() {
    let temp_dir = TempDir::new().unwrap();
    let documents = load(&temp_dir);

    let mut settings = Settings::default();
    settings.clustering.k = Some(2);
    settings.labeling.keyword_categories =
        vec![pattern_learner::patterns::KeywordCategory::new("search", &["search"])];
    let report = PatternLearner::new(settings)
        .discover_documents(&documents, &mut StdRng::seed_from_u64(4));

    let categories: BTreeSet<&str> = report
        .cluster_patterns()
        .map(|p| p.category.as_str())
        .collect();
    assert_eq!(categories, BTreeSet::from(["general", "search"]));
}
