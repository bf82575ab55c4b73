//! TF-IDF vectorizer restored from a fitted scikit-learn export.
use std::{collections::HashMap, fs, path::Path};

use regex::Regex;
use serde::Deserialize;

use super::context::ArtifactError;

const ARTIFACT_KIND: &str = "vectorizer";
const DEFAULT_TOKEN_PATTERN: &str = r"(?u)\b\w\w+\b";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    L1,
    L2,
}

#[derive(Debug, Deserialize)]
struct VectorizerArtifact {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    #[serde(default = "default_ngram_range")]
    ngram_range: (usize, usize),
    #[serde(default)]
    sublinear_tf: bool,
    #[serde(default = "default_norm")]
    norm: Option<Norm>,
    #[serde(default = "default_lowercase")]
    lowercase: bool,
    #[serde(default)]
    token_pattern: Option<String>,
}

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}

#[allow(clippy::unnecessary_wraps)]
fn default_norm() -> Option<Norm> {
    Some(Norm::L2)
}

fn default_lowercase() -> bool {
    true
}

impl VectorizerArtifact {
    fn validate(&self) -> Result<(), ArtifactError> {
        let (min_n, max_n) = self.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(invalid(format!(
                "ngram_range must satisfy 1 <= min <= max, got ({min_n}, {max_n})"
            )));
        }
        if self.vocabulary.len() != self.idf.len() {
            return Err(invalid(format!(
                "vocabulary has {} terms but idf has {} weights",
                self.vocabulary.len(),
                self.idf.len()
            )));
        }
        let mut seen = vec![false; self.idf.len()];
        for (term, &index) in &self.vocabulary {
            let Some(slot) = seen.get_mut(index) else {
                return Err(invalid(format!(
                    "term {term:?} points at index {index} outside {} features",
                    self.idf.len()
                )));
            };
            if *slot {
                return Err(invalid(format!("index {index} is assigned twice")));
            }
            *slot = true;
        }
        if self.idf.iter().any(|weight| !weight.is_finite()) {
            return Err(invalid("idf contains non-finite weights".to_string()));
        }
        Ok(())
    }
}

fn invalid(reason: String) -> ArtifactError {
    ArtifactError::Invalid {
        kind: ARTIFACT_KIND,
        reason,
    }
}

/// Sparse feature vector over the fitted vocabulary, sorted by index.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    dimension: usize,
    entries: Vec<(usize, f64)>,
}

impl FeatureVector {
    #[must_use]
    pub fn new(dimension: usize, mut entries: Vec<(usize, f64)>) -> Self {
        entries.sort_unstable_by_key(|(index, _)| *index);
        Self { dimension, entries }
    }

    #[must_use]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    #[must_use]
    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Dot product against a dense weight row.
    #[must_use]
    pub fn dot(&self, weights: &[f64]) -> f64 {
        self.entries
            .iter()
            .filter_map(|(index, value)| weights.get(*index).map(|weight| weight * value))
            .sum()
    }
}

#[derive(Debug)]
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    ngram_range: (usize, usize),
    sublinear_tf: bool,
    norm: Option<Norm>,
    lowercase: bool,
    token_re: Regex,
}

impl TfidfVectorizer {
    /// # Errors
    /// Returns an error when the file cannot be read or is not a valid export.
    pub fn from_path(path: &Path) -> Result<Self, ArtifactError> {
        let raw = fs::read_to_string(path).map_err(|source| ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    /// # Errors
    /// Returns an error when `raw` is not a valid vectorizer export.
    pub fn from_json(raw: &str) -> Result<Self, ArtifactError> {
        let artifact: VectorizerArtifact =
            serde_json::from_str(raw).map_err(|source| ArtifactError::Parse {
                kind: ARTIFACT_KIND,
                source,
            })?;
        artifact.validate()?;

        let pattern = artifact
            .token_pattern
            .as_deref()
            .unwrap_or(DEFAULT_TOKEN_PATTERN);
        let token_re = Regex::new(pattern)
            .map_err(|error| invalid(format!("token_pattern does not compile: {error}")))?;

        Ok(Self {
            vocabulary: artifact.vocabulary,
            idf: artifact.idf,
            ngram_range: artifact.ngram_range,
            sublinear_tf: artifact.sublinear_tf,
            norm: artifact.norm,
            lowercase: artifact.lowercase,
            token_re,
        })
    }

    /// Number of features (vocabulary size).
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.idf.len()
    }

    /// Vocabulary terms ordered by feature index.
    #[must_use]
    pub fn feature_names(&self) -> Vec<&str> {
        let mut names = vec![""; self.idf.len()];
        for (term, &index) in &self.vocabulary {
            names[index] = term.as_str();
        }
        names
    }

    #[must_use]
    pub fn transform(&self, text: &str) -> FeatureVector {
        let prepared = if self.lowercase {
            text.to_lowercase()
        } else {
            text.to_string()
        };
        let tokens: Vec<&str> = self
            .token_re
            .find_iter(&prepared)
            .map(|mat| mat.as_str())
            .collect();

        let mut counts: HashMap<usize, f64> = HashMap::new();
        let (min_n, max_n) = self.ngram_range;
        for n in min_n..=max_n {
            if n > tokens.len() {
                break;
            }
            for window in tokens.windows(n) {
                let gram = window.join(" ");
                if let Some(&index) = self.vocabulary.get(&gram) {
                    *counts.entry(index).or_insert(0.0) += 1.0;
                }
            }
        }

        let mut entries: Vec<(usize, f64)> = counts
            .into_iter()
            .map(|(index, count)| {
                let tf = if self.sublinear_tf {
                    1.0 + count.ln()
                } else {
                    count
                };
                (index, tf * self.idf[index])
            })
            .collect();

        let norm = match self.norm {
            Some(Norm::L2) => entries.iter().map(|(_, v)| v * v).sum::<f64>().sqrt(),
            Some(Norm::L1) => entries.iter().map(|(_, v)| v.abs()).sum::<f64>(),
            None => 1.0,
        };
        if norm > 0.0 {
            for (_, value) in &mut entries {
                *value /= norm;
            }
        }

        FeatureVector::new(self.idf.len(), entries)
    }
}
