//! Scoring metrics between a response and a category label.

use crate::model::EmbeddingModel;
use crate::normalize::normalize;

/// Finite stand-in recorded when the distance metric reports `INFINITY`
/// (no usable tokens on at least one side). Infinity is not representable
/// in the sorted, serialized result structure.
pub const DISTANCE_SENTINEL: f32 = 10.0;

/// Metric used for every cell of a run's similarity matrices. A run uses
/// exactly one metric; the two polarities are never mixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    /// Transportation-style distance; lower is more similar (arg-min).
    Distance,
    /// Cosine-style similarity; higher is more similar (arg-max).
    Similarity,
}

impl Metric {
    /// True when lower scores are better and assignment arg-mins.
    pub fn is_distance(self) -> bool {
        matches!(self, Metric::Distance)
    }

    /// Scores one response against one category label.
    pub fn score(self, response: &str, label: &str, model: &dyn EmbeddingModel) -> f32 {
        match self {
            Metric::Distance => distance_score(response, label, model),
            Metric::Similarity => similarity_score(response, label, model),
        }
    }
}

impl Default for Metric {
    fn default() -> Self {
        Metric::Distance
    }
}

/// Cosine-style similarity between two texts.
///
/// Identical inputs short-circuit to `1.0` before any stopword stripping,
/// so trivial matches are never penalized for being made of stopwords.
/// Texts sharing no content words are defined as unrelated (`0.0`), not
/// unknown. Otherwise tokens absent from the model vocabulary are dropped
/// from each side and the model's bag-of-words similarity is returned.
pub fn similarity_score(s1: &str, s2: &str, model: &dyn EmbeddingModel) -> f32 {
    if s1 == s2 {
        return 1.0;
    }

    let tokens1 = normalize(s1);
    let tokens2 = normalize(s2);

    let shares_token = tokens1
        .iter()
        .any(|token| tokens2.iter().any(|other| other == token));
    if !shares_token {
        return 0.0;
    }

    let in_vocab1: Vec<&str> = tokens1
        .iter()
        .map(String::as_str)
        .filter(|token| model.contains(token))
        .collect();
    let in_vocab2: Vec<&str> = tokens2
        .iter()
        .map(String::as_str)
        .filter(|token| model.contains(token))
        .collect();

    model.similarity(&in_vocab1, &in_vocab2)
}

/// Transportation distance between a response and a category label.
///
/// No identity short-circuit: both sides are normalized and handed to the
/// model. `INFINITY` signals vocabulary exhaustion; callers map it to
/// [`DISTANCE_SENTINEL`] before recording a score.
pub fn distance_score(text: &str, label: &str, model: &dyn EmbeddingModel) -> f32 {
    let text_tokens = normalize(text);
    let label_tokens = normalize(label);

    let text_bag: Vec<&str> = text_tokens.iter().map(String::as_str).collect();
    let label_bag: Vec<&str> = label_tokens.iter().map(String::as_str).collect();

    model.distance(&text_bag, &label_bag)
}
