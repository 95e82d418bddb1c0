use regex::Regex;
use serde::Deserialize;

use std::collections::{HashMap, HashSet};

use crate::Error;

const DEFAULT_TOKEN_PATTERN: &str = r"(?u)\b\w\w+\b";

/// Sparse feature row. Entries are sorted by column and never repeat a column.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SparseVector {
    pub dim: usize,
    pub entries: Vec<(usize, f64)>,
}

impl SparseVector {
    pub fn dot(&self, weights: &[f64]) -> f64 {
        self.entries
            .iter()
            .filter_map(|(col, value)| weights.get(*col).map(|w| w * value))
            .sum()
    }

    #[cfg(test)]
    pub fn get(&self, col: usize) -> f64 {
        self.entries
            .binary_search_by_key(&col, |(c, _)| *c)
            .map(|idx| self.entries[idx].1)
            .unwrap_or(0.0)
    }
}

pub trait Vectorizer: Send + Sync {
    fn transform(&self, docs: &[&str]) -> Vec<SparseVector>;
    fn dim(&self) -> usize;
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    L1,
    L2,
}

#[derive(Debug, Deserialize, Clone)]
struct TfidfArtifact {
    vocabulary: HashMap<String, usize>,
    #[serde(default)]
    idf: Option<Vec<f64>>,
    #[serde(default = "default_norm")]
    norm: Option<Norm>,
    #[serde(default = "default_lowercase")]
    lowercase: bool,
    #[serde(default = "default_token_pattern")]
    token_pattern: String,
    #[serde(default = "default_ngram_range")]
    ngram_range: (usize, usize),
    #[serde(default)]
    stop_words: Option<Vec<String>>,
    #[serde(default)]
    binary: bool,
    #[serde(default)]
    sublinear_tf: bool,
}

fn default_norm() -> Option<Norm> {
    Some(Norm::L2)
}

fn default_lowercase() -> bool {
    true
}

fn default_token_pattern() -> String {
    DEFAULT_TOKEN_PATTERN.to_string()
}

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}

/// Bag of words vectorizer with optional idf weighting, loaded from a JSON
/// artifact.
#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Option<Vec<f64>>,
    norm: Option<Norm>,
    lowercase: bool,
    token_pattern: Regex,
    ngram_range: (usize, usize),
    stop_words: HashSet<String>,
    binary: bool,
    sublinear_tf: bool,
    dim: usize,
}

impl TfidfVectorizer {
    #[cfg(test)]
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let artifact: TfidfArtifact = serde_json::from_str(json)?;
        Self::from_artifact(artifact)
    }

    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self, Error> {
        let artifact: TfidfArtifact = serde_json::from_reader(reader)?;
        Self::from_artifact(artifact)
    }

    fn from_artifact(artifact: TfidfArtifact) -> Result<Self, Error> {
        let dim = artifact.vocabulary.len();
        if let Some((term, col)) = artifact.vocabulary.iter().find(|(_, col)| **col >= dim) {
            return Err(Error::ArtifactMismatch(format!(
                "vocabulary term {:?} has column {} but there are only {} terms",
                term, col, dim
            )));
        }
        if let Some(idf) = &artifact.idf {
            if idf.len() != dim {
                return Err(Error::ArtifactMismatch(format!(
                    "idf has {} weights for {} terms",
                    idf.len(),
                    dim
                )));
            }
        }
        let (min_n, max_n) = artifact.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(Error::ArtifactMismatch(format!(
                "invalid ngram range ({}, {})",
                min_n, max_n
            )));
        }
        let token_pattern = Regex::new(&artifact.token_pattern)
            .map_err(|e| Error::ArtifactMismatch(format!("bad token pattern: {}", e)))?;

        Ok(Self {
            vocabulary: artifact.vocabulary,
            idf: artifact.idf,
            norm: artifact.norm,
            lowercase: artifact.lowercase,
            token_pattern,
            ngram_range: artifact.ngram_range,
            stop_words: artifact.stop_words.unwrap_or_default().into_iter().collect(),
            binary: artifact.binary,
            sublinear_tf: artifact.sublinear_tf,
            dim,
        })
    }

    fn tokens(&self, doc: &str) -> Vec<String> {
        let doc = if self.lowercase {
            doc.to_lowercase()
        } else {
            doc.to_string()
        };
        self.token_pattern
            .find_iter(&doc)
            .map(|m| m.as_str().to_string())
            .filter(|token| !self.stop_words.contains(token))
            .collect()
    }

    fn ngrams(&self, tokens: &[String]) -> Vec<String> {
        let (min_n, max_n) = self.ngram_range;
        let mut grams = vec![];
        for n in min_n..=max_n {
            if n > tokens.len() {
                break;
            }
            grams.extend(tokens.windows(n).map(|window| window.join(" ")));
        }
        grams
    }

    fn transform_one(&self, doc: &str) -> SparseVector {
        let mut counts: HashMap<usize, f64> = HashMap::new();
        for gram in self.ngrams(&self.tokens(doc)) {
            if let Some(col) = self.vocabulary.get(&gram) {
                *counts.entry(*col).or_insert(0.0) += 1.0;
            }
        }

        let mut entries: Vec<(usize, f64)> = counts
            .into_iter()
            .map(|(col, mut tf)| {
                if self.binary {
                    tf = 1.0;
                }
                if self.sublinear_tf {
                    tf = 1.0 + tf.ln();
                }
                if let Some(idf) = &self.idf {
                    tf *= idf[col];
                }
                (col, tf)
            })
            .collect();
        entries.sort_by_key(|(col, _)| *col);

        let scale = match self.norm {
            Some(Norm::L2) => entries.iter().map(|(_, v)| v * v).sum::<f64>().sqrt(),
            Some(Norm::L1) => entries.iter().map(|(_, v)| v.abs()).sum::<f64>(),
            None => 1.0,
        };
        if scale > 0.0 {
            for (_, value) in entries.iter_mut() {
                *value /= scale;
            }
        }

        SparseVector {
            dim: self.dim,
            entries,
        }
    }
}

impl Vectorizer for TfidfVectorizer {
    fn transform(&self, docs: &[&str]) -> Vec<SparseVector> {
        docs.iter().map(|doc| self.transform_one(doc)).collect()
    }

    fn dim(&self) -> usize {
        self.dim
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn counts_only() -> TfidfVectorizer {
        TfidfVectorizer::from_json(
            r#"{"vocabulary": {"good": 0, "bad": 1, "mall": 2}, "norm": null}"#,
        )
        .unwrap()
    }

    #[test]
    fn counts_in_vocabulary_tokens() {
        let vectorizer = counts_only();
        let rows = vectorizer.transform(&["Good good MALL, a bad day"]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].dim, 3);
        assert_eq!(rows[0].entries, vec![(0, 2.0), (1, 1.0), (2, 1.0)]);
    }

    #[test]
    fn single_character_tokens_are_skipped() {
        let vectorizer =
            TfidfVectorizer::from_json(r#"{"vocabulary": {"a": 0, "ok": 1}, "norm": null}"#)
                .unwrap();
        let rows = vectorizer.transform(&["a ok"]);
        assert_eq!(rows[0].entries, vec![(1, 1.0)]);
    }

    #[test]
    fn unknown_text_gives_empty_vector() {
        let vectorizer = counts_only();
        let rows = vectorizer.transform(&["nothing matches here"]);
        assert!(rows[0].entries.is_empty());
    }

    #[test]
    fn idf_and_l2_norm() {
        let vectorizer = TfidfVectorizer::from_json(
            r#"{"vocabulary": {"good": 0, "service": 1}, "idf": [1.0, 2.0]}"#,
        )
        .unwrap();
        let row = &vectorizer.transform(&["good service"])[0];
        let norm = (1.0f64 + 4.0).sqrt();
        assert!((row.get(0) - 1.0 / norm).abs() < EPS);
        assert!((row.get(1) - 2.0 / norm).abs() < EPS);
    }

    #[test]
    fn sublinear_binary_and_l1() {
        let sublinear = TfidfVectorizer::from_json(
            r#"{"vocabulary": {"good": 0}, "sublinear_tf": true, "norm": null}"#,
        )
        .unwrap();
        let row = &sublinear.transform(&["good good good"])[0];
        assert!((row.get(0) - (1.0 + 3.0f64.ln())).abs() < EPS);

        let binary = TfidfVectorizer::from_json(
            r#"{"vocabulary": {"good": 0, "shop": 1}, "binary": true, "norm": "l1"}"#,
        )
        .unwrap();
        let row = &binary.transform(&["good good shop"])[0];
        assert!((row.get(0) - 0.5).abs() < EPS);
        assert!((row.get(1) - 0.5).abs() < EPS);
    }

    #[test]
    fn bigrams_and_stop_words() {
        let vectorizer = TfidfVectorizer::from_json(
            r#"{
                "vocabulary": {"not good": 0, "good": 1, "not": 2},
                "ngram_range": [1, 2],
                "stop_words": ["the"],
                "norm": null
            }"#,
        )
        .unwrap();
        let row = &vectorizer.transform(&["Not the good"])[0];
        assert_eq!(row.entries, vec![(0, 1.0), (1, 1.0), (2, 1.0)]);
    }

    #[test]
    fn rejects_inconsistent_artifacts() {
        let bad_idf =
            TfidfVectorizer::from_json(r#"{"vocabulary": {"good": 0}, "idf": [1.0, 2.0]}"#);
        assert!(matches!(bad_idf, Err(Error::ArtifactMismatch(_))));

        let bad_index = TfidfVectorizer::from_json(r#"{"vocabulary": {"good": 3}}"#);
        assert!(matches!(bad_index, Err(Error::ArtifactMismatch(_))));

        let bad_range =
            TfidfVectorizer::from_json(r#"{"vocabulary": {"good": 0}, "ngram_range": [2, 1]}"#);
        assert!(matches!(bad_range, Err(Error::ArtifactMismatch(_))));

        let not_json = TfidfVectorizer::from_json("vocabulary = 1");
        assert!(matches!(not_json, Err(Error::ArtifactError(_))));
    }

    #[test]
    fn dot_ignores_out_of_range_columns() {
        let row = SparseVector {
            dim: 3,
            entries: vec![(0, 2.0), (2, 1.0)],
        };
        assert!((row.dot(&[1.0, 5.0, -1.0]) - 1.0).abs() < EPS);
        assert!((row.dot(&[1.0]) - 2.0).abs() < EPS);
    }
}
