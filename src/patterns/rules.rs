//! Rule tables used to name discovered clusters.
//!
//! Rules are plain data so alternate tables can be loaded from settings or
//! built in tests without touching the labeler.

use serde::{Deserialize, Serialize};

/// How a condition compares a profile value with its threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    AtLeast,
    AtMost,
}

/// One threshold test on a named feature of the cluster's mean profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub feature: String,
    pub comparison: Comparison,
    pub threshold: f32,
}

impl Condition {
    pub fn at_least(feature: &str, threshold: f32) -> Self {
        Self {
            feature: feature.to_string(),
            comparison: Comparison::AtLeast,
            threshold,
        }
    }

    pub fn at_most(feature: &str, threshold: f32) -> Self {
        Self {
            feature: feature.to_string(),
            comparison: Comparison::AtMost,
            threshold,
        }
    }

    /// A condition on a feature missing from the profile never matches.
    pub fn matches(&self, profile: &FeatureProfile<'_>) -> bool {
        match profile.value(&self.feature) {
            Some(value) => match self.comparison {
                Comparison::AtLeast => value >= self.threshold,
                Comparison::AtMost => value <= self.threshold,
            },
            None => false,
        }
    }
}

/// Name, category and description assigned when a rule matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelRule {
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub description: String,
    /// All conditions must hold; an empty list always matches
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl LabelRule {
    pub fn new(name: &str, category: &str, description: &str, conditions: Vec<Condition>) -> Self {
        Self {
            name: name.to_string(),
            category: category.to_string(),
            description: description.to_string(),
            conditions,
        }
    }

    pub fn matches(&self, profile: &FeatureProfile<'_>) -> bool {
        self.conditions.iter().all(|c| c.matches(profile))
    }
}

/// Keywords that place a text cluster in a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordCategory {
    pub category: String,
    pub keywords: Vec<String>,
}

impl KeywordCategory {
    pub fn new(category: &str, keywords: &[&str]) -> Self {
        Self {
            category: category.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// Complete labeling configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelRules {
    /// Ordered code rules; the first match names the cluster
    #[serde(default = "default_code_rules")]
    pub code_rules: Vec<LabelRule>,

    /// Used when no code rule matches
    #[serde(default = "default_fallback")]
    pub fallback: LabelRule,

    /// Ordered keyword categories for text clusters
    #[serde(default = "default_keyword_categories")]
    pub keyword_categories: Vec<KeywordCategory>,

    /// Number of dominant terms used to name a text cluster
    #[serde(default = "default_top_terms")]
    pub top_terms: usize,
}

impl Default for LabelRules {
    fn default() -> Self {
        Self {
            code_rules: default_code_rules(),
            fallback: default_fallback(),
            keyword_categories: default_keyword_categories(),
            top_terms: default_top_terms(),
        }
    }
}

impl LabelRules {
    /// First code rule matching `profile`, or the fallback.
    pub fn code_label(&self, profile: &FeatureProfile<'_>) -> &LabelRule {
        self.code_rules
            .iter()
            .find(|rule| rule.matches(profile))
            .unwrap_or(&self.fallback)
    }

    /// First category with a keyword among `terms`, or `"general"`.
    pub fn text_category<S: AsRef<str>>(&self, terms: &[S]) -> &str {
        self.keyword_categories
            .iter()
            .find(|category| {
                terms
                    .iter()
                    .any(|term| category.keywords.iter().any(|k| k == term.as_ref()))
            })
            .map_or("general", |category| category.category.as_str())
    }
}

/// Mean feature values of a cluster, addressable by feature name.
#[derive(Debug, Clone, Copy)]
pub struct FeatureProfile<'a> {
    names: &'a [String],
    values: &'a [f32],
}

impl<'a> FeatureProfile<'a> {
    pub fn new(names: &'a [String], values: &'a [f32]) -> Self {
        Self { names, values }
    }

    pub fn value(&self, feature: &str) -> Option<f32> {
        self.names
            .iter()
            .position(|name| name == feature)
            .and_then(|i| self.values.get(i).copied())
    }
}

fn default_code_rules() -> Vec<LabelRule> {
    vec![
        LabelRule::new(
            "High-complexity functions",
            "complexity",
            "Units with many branch points",
            vec![Condition::at_least("complexity", 10.0)],
        ),
        LabelRule::new(
            "Deeply nested logic",
            "complexity",
            "Control flow nested four or more levels deep",
            vec![Condition::at_least("nesting_depth", 4.0)],
        ),
        LabelRule::new(
            "Long parameter lists",
            "interface",
            "Signatures taking five or more parameters",
            vec![Condition::at_least("parameter_count", 5.0)],
        ),
        LabelRule::new(
            "Large containers",
            "structure",
            "Types or impls owning many members",
            vec![Condition::at_least("child_count", 8.0)],
        ),
        LabelRule::new(
            "Large units",
            "size",
            "Definitions spanning fifty or more lines",
            vec![Condition::at_least("line_count", 50.0)],
        ),
        LabelRule::new(
            "Async workflows",
            "concurrency",
            "Mostly asynchronous functions",
            vec![Condition::at_least("is_async", 0.5)],
        ),
        LabelRule::new(
            "Small documented helpers",
            "documentation",
            "Short definitions that carry documentation",
            vec![
                Condition::at_most("line_count", 15.0),
                Condition::at_least("has_doc", 0.5),
            ],
        ),
        LabelRule::new(
            "Undocumented small helpers",
            "documentation",
            "Short definitions without documentation",
            vec![
                Condition::at_most("line_count", 15.0),
                Condition::at_most("has_doc", 0.5),
            ],
        ),
        LabelRule::new(
            "Well-documented units",
            "documentation",
            "Medium-sized definitions that are consistently documented",
            vec![Condition::at_least("has_doc", 0.8)],
        ),
    ]
}

fn default_fallback() -> LabelRule {
    LabelRule::new(
        "Mixed structure",
        "general",
        "No single dominant characteristic",
        Vec::new(),
    )
}

fn default_keyword_categories() -> Vec<KeywordCategory> {
    vec![
        KeywordCategory::new(
            "bug",
            &[
                "bug", "crash", "crashes", "error", "errors", "fail", "fails", "failure",
                "broken", "panic", "exception",
            ],
        ),
        KeywordCategory::new(
            "performance",
            &["slow", "performance", "memory", "latency", "leak", "timeout"],
        ),
        KeywordCategory::new(
            "documentation",
            &["docs", "documentation", "readme", "typo", "example"],
        ),
        KeywordCategory::new("testing", &["test", "tests", "flaky", "coverage"]),
        KeywordCategory::new(
            "feature",
            &["feature", "support", "add", "request", "enhancement"],
        ),
    ]
}

fn default_top_terms() -> usize {
    3
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let rules = LabelRules::default();
        let feature_names = names(&["line_count", "complexity", "has_doc", "nesting_depth"]);

        let values = [80.0, 14.0, 0.0, 5.0];
        let profile = FeatureProfile::new(&feature_names, &values);
        assert_eq!(rules.code_label(&profile).name, "High-complexity functions");

        let values = [6.0, 1.0, 1.0, 0.0];
        let profile = FeatureProfile::new(&feature_names, &values);
        assert_eq!(rules.code_label(&profile).name, "Small documented helpers");
    }

    #[test]
    fn test_fallback_when_nothing_matches() {
        let rules = LabelRules::default();
        let feature_names = names(&["line_count", "has_doc"]);
        let values = [30.0, 0.6];
        let profile = FeatureProfile::new(&feature_names, &values);

        assert_eq!(rules.code_label(&profile).category, "general");
    }

    #[test]
    fn test_missing_feature_never_matches() {
        let feature_names = names(&["line_count"]);
        let values = [100.0];
        let profile = FeatureProfile::new(&feature_names, &values);

        assert!(!Condition::at_least("complexity", 0.0).matches(&profile));
        assert!(Condition::at_least("line_count", 100.0).matches(&profile));
    }

    #[test]
    fn test_custom_rule_table() {
        let rules = LabelRules {
            code_rules: vec![LabelRule::new(
                "Tiny",
                "size",
                "",
                vec![Condition::at_most("line_count", 3.0)],
            )],
            ..LabelRules::default()
        };
        let feature_names = names(&["line_count"]);
        let values = [2.0];
        assert_eq!(
            rules.code_label(&FeatureProfile::new(&feature_names, &values)).name,
            "Tiny"
        );
    }

    #[test]
    fn test_text_category() {
        let rules = LabelRules::default();
        assert_eq!(rules.text_category(&["parser", "crash"]), "bug");
        assert_eq!(rules.text_category(&["slow", "indexing"]), "performance");
        assert_eq!(rules.text_category(&["roadmap"]), "general");
    }
}
