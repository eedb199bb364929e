//! Document entities, tokenization and vocabulary fitting.

use crate::config::TextConfig;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// A free-text document (an issue, a commit message, a ticket).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Issue numbers are accepted and stored as strings
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub labels: Vec<String>,
}

impl Document {
    pub fn new(id: impl Into<String>, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            body: body.into(),
            labels: Vec::new(),
        }
    }

    /// Title and body joined for tokenization.
    pub fn text(&self) -> String {
        format!("{}\n{}", self.title, self.body)
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(u64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(text) => text,
        Id::Number(number) => number.to_string(),
    })
}

/// Splits text into lowercase terms.
///
/// Tokens break on anything that is not alphanumeric or `_`. Tokens shorter
/// than `min_term_length`, pure numbers and stopwords are dropped.
pub fn tokenize(text: &str, config: &TextConfig) -> Vec<String> {
    let stopwords: HashSet<&str> = config.stopwords.iter().map(String::as_str).collect();

    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .filter(|token| token.chars().count() >= config.min_term_length)
        .filter(|token| !token.chars().all(|c| c.is_ascii_digit()))
        .filter(|token| !stopwords.contains(token.as_str()))
        .collect()
}

/// Ordered term list fitted over a batch of documents.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Vocabulary {
    terms: Vec<String>,
    index: HashMap<String, usize>,
}

impl Vocabulary {
    /// Fit a vocabulary over tokenized documents.
    ///
    /// Terms are ordered by descending document frequency, then
    /// alphabetically. Terms found in fewer than `min_document_frequency`
    /// documents are dropped and at most `max_terms` are kept.
    pub fn fit<S: AsRef<str>>(
        documents: &[Vec<S>],
        min_document_frequency: usize,
        max_terms: usize,
    ) -> Self {
        let mut document_frequency: BTreeMap<&str, usize> = BTreeMap::new();
        for tokens in documents {
            let unique: HashSet<&str> = tokens.iter().map(AsRef::as_ref).collect();
            for term in unique {
                *document_frequency.entry(term).or_default() += 1;
            }
        }

        let mut ranked: Vec<(&str, usize)> = document_frequency
            .into_iter()
            .filter(|&(_, df)| df >= min_document_frequency)
            .collect();
        // BTreeMap iteration is alphabetical; stable sort keeps that for ties
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(max_terms);

        Self::from_terms(ranked.into_iter().map(|(term, _)| term.to_string()).collect())
    }

    pub fn from_terms(terms: Vec<String>) -> Self {
        let index = terms
            .iter()
            .enumerate()
            .map(|(i, term)| (term.clone(), i))
            .collect();
        Self { terms, index }
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn term(&self, index: usize) -> Option<&str> {
        self.terms.get(index).map(String::as_str)
    }

    pub fn index_of(&self, term: &str) -> Option<usize> {
        self.index.get(term).copied()
    }

    /// Raw term counts over this vocabulary.
    ///
    /// Returns `None` when none of the tokens are in the vocabulary.
    pub fn count_vector<S: AsRef<str>>(&self, tokens: &[S]) -> Option<Vec<f32>> {
        let mut counts = vec![0.0f32; self.terms.len()];
        let mut hits = 0usize;

        for token in tokens {
            if let Some(i) = self.index_of(token.as_ref()) {
                counts[i] += 1.0;
                hits += 1;
            }
        }

        (hits > 0).then_some(counts)
    }
}
