use serde::Deserialize;

use crate::vectorizer::SparseVector;
use crate::Error;

pub trait Classifier: Send + Sync {
    fn predict(&self, features: &[SparseVector]) -> Vec<i64>;
}

/// Trained decision model as exported to JSON.
#[derive(Debug, Deserialize, Clone)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ArtifactClassifier {
    Linear {
        coef: Vec<f64>,
        intercept: f64,
        classes: [i64; 2],
    },
    MultinomialNb {
        classes: Vec<i64>,
        class_log_prior: Vec<f64>,
        feature_log_prob: Vec<Vec<f64>>,
    },
}

impl ArtifactClassifier {
    #[cfg(test)]
    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self, Error> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Number of feature columns the model was trained on
    pub fn dim(&self) -> usize {
        match self {
            ArtifactClassifier::Linear { coef, .. } => coef.len(),
            ArtifactClassifier::MultinomialNb {
                feature_log_prob, ..
            } => feature_log_prob.first().map(Vec::len).unwrap_or(0),
        }
    }

    pub fn check_shape(&self, dim: usize) -> Result<(), Error> {
        if let ArtifactClassifier::MultinomialNb {
            classes,
            class_log_prior,
            feature_log_prob,
        } = self
        {
            if classes.is_empty() {
                return Err(Error::ArtifactMismatch("classifier has no classes".to_string()));
            }
            if class_log_prior.len() != classes.len() || feature_log_prob.len() != classes.len() {
                return Err(Error::ArtifactMismatch(format!(
                    "{} classes but {} priors and {} probability rows",
                    classes.len(),
                    class_log_prior.len(),
                    feature_log_prob.len()
                )));
            }
            if feature_log_prob.iter().any(|row| row.len() != dim) {
                return Err(Error::ArtifactMismatch(format!(
                    "probability rows must all have {} columns",
                    dim
                )));
            }
        }
        if self.dim() != dim {
            return Err(Error::ArtifactMismatch(format!(
                "classifier expects {} features but vectorizer produces {}",
                self.dim(),
                dim
            )));
        }
        Ok(())
    }

    fn predict_one(&self, row: &SparseVector) -> i64 {
        match self {
            ArtifactClassifier::Linear {
                coef,
                intercept,
                classes,
            } => {
                if row.dot(coef) + intercept > 0.0 {
                    classes[1]
                } else {
                    classes[0]
                }
            }
            ArtifactClassifier::MultinomialNb {
                classes,
                class_log_prior,
                feature_log_prob,
            } => {
                let mut best: Option<(i64, f64)> = None;
                for ((class, prior), log_prob) in
                    classes.iter().zip(class_log_prior).zip(feature_log_prob)
                {
                    let score = prior + row.dot(log_prob);
                    // Strictly greater keeps the first class on ties
                    if best.map(|(_, top)| score > top).unwrap_or(true) {
                        best = Some((*class, score));
                    }
                }
                best.map(|(class, _)| class).unwrap_or_default()
            }
        }
    }
}

impl Classifier for ArtifactClassifier {
    fn predict(&self, features: &[SparseVector]) -> Vec<i64> {
        features.iter().map(|row| self.predict_one(row)).collect()
    }
}
