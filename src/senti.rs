use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use std::fmt;
use std::str::FromStr;

use log::*;

use crate::classifier::Classifier;
use crate::vectorizer::Vectorizer;
use crate::Error;

/// Label the classifier uses for positive feedback
pub const POSITIVE_LABEL: i64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sentiment {
    Positive,
    Negative,
}

impl Sentiment {
    /// Anything that is not the positive label counts as negative.
    pub fn from_label(label: i64) -> Self {
        if label == POSITIVE_LABEL {
            Sentiment::Positive
        } else {
            Sentiment::Negative
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Sentiment::Positive => "Positive",
            Sentiment::Negative => "Negative",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Sentiment {
    type Err = String;

    // Older stores wrote the label behind an emoji, e.g. "✅ Positive".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let word = s.trim_start_matches(|c: char| !c.is_alphabetic()).trim_end();
        match word.to_lowercase().as_str() {
            "positive" => Ok(Sentiment::Positive),
            "negative" => Ok(Sentiment::Negative),
            _ => Err(format!("unknown sentiment {:?}", s)),
        }
    }
}

impl Serialize for Sentiment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Sentiment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(de::Error::custom)
    }
}

pub struct Senti {
    vectorizer: Box<dyn Vectorizer>,
    classifier: Box<dyn Classifier>,
}

impl Senti {
    pub fn new<V, C>(vectorizer: V, classifier: C) -> Self
    where
        V: Vectorizer + 'static,
        C: Classifier + 'static,
    {
        Self {
            vectorizer: Box::new(vectorizer),
            classifier: Box::new(classifier),
        }
    }

    pub fn sentimentice(&self, input: &str) -> Result<Sentiment, Error> {
        let features = self.vectorizer.transform(&[input]);
        let label = self
            .classifier
            .predict(&features)
            .first()
            .copied()
            .ok_or(Error::NoPrediction)?;
        let sentiment = Sentiment::from_label(label);
        debug!("Classifier label {} -> {}", label, sentiment);
        Ok(sentiment)
    }
}
