//! Best-match selection and ranked per-category buckets.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::matrix::SimilarityMatrix;
use crate::metric::{Metric, DISTANCE_SENTINEL};

/// Reserved category label collecting responses that could not be
/// confidently matched. Its bucket keeps encounter order: the recorded
/// scores are not a meaningful ranking signal there.
pub const NOVEL_CATEGORY: &str = "Novel";

/// A response paired with the score of its winning category.
///
/// The `response` and `score` field names are the stable contract the
/// display, word-cloud, and export collaborators rely on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredResponse {
    pub response: String,
    pub score: f32,
}

/// Category label → scored responses for one domain.
pub type CategoryBuckets = BTreeMap<String, Vec<ScoredResponse>>;

/// Assigns every matrix row to its best-scoring category and ranks each
/// bucket.
///
/// Selection is arg-min for the distance metric and arg-max for the
/// similarity metric; on ties the earliest declared category wins, making
/// declaration order an implicit tie-break priority. Infinite distances are
/// recorded as [`DISTANCE_SENTINEL`]. Every declared category receives a
/// bucket even when empty, so consumers can tell "no matches" apart from
/// "never declared". Non-empty buckets other than [`NOVEL_CATEGORY`] are
/// sorted ascending by score with a stable sort.
pub fn assign_and_rank(
    matrix: &SimilarityMatrix,
    retained: &[String],
    categories: &[String],
    metric: Metric,
) -> CategoryBuckets {
    let mut buckets: CategoryBuckets = categories
        .iter()
        .map(|category| (category.clone(), Vec::new()))
        .collect();

    for (row, response) in retained.iter().enumerate() {
        let scores = matrix.row(row);
        let Some(winner) = best_column(scores, metric) else {
            continue;
        };

        let mut score = scores[winner];
        if score == f32::INFINITY {
            score = DISTANCE_SENTINEL;
        }

        buckets
            .entry(categories[winner].clone())
            .or_default()
            .push(ScoredResponse {
                response: response.clone(),
                score,
            });
    }

    for (category, bucket) in buckets.iter_mut() {
        if bucket.is_empty() || category == NOVEL_CATEGORY {
            continue;
        }
        bucket.sort_by(|a, b| a.score.partial_cmp(&b.score).unwrap_or(Ordering::Equal));
    }

    buckets
}

/// Index of the best score under the metric's polarity. Strict comparison
/// keeps the first (lowest-index) column on ties.
fn best_column(scores: &[f32], metric: Metric) -> Option<usize> {
    let mut best: Option<usize> = None;

    for (column, &score) in scores.iter().enumerate() {
        let better = match best {
            None => true,
            Some(current) => {
                if metric.is_distance() {
                    score < scores[current]
                } else {
                    score > scores[current]
                }
            }
        };
        if better {
            best = Some(column);
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::build_matrix;
    use crate::model::WordEmbeddings;

    fn model() -> WordEmbeddings {
        WordEmbeddings::from_entries(
            2,
            vec![
                ("park".to_string(), vec![0.8, 0.6]),
                ("clean".to_string(), vec![1.0, 0.0]),
                ("cleanliness".to_string(), vec![1.0, 0.0]),
                ("safety".to_string(), vec![0.0, 1.0]),
                ("unsafe".to_string(), vec![0.0, 1.0]),
            ],
        )
        .unwrap()
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    fn buckets_for(responses: &[&str], categories: &[&str]) -> CategoryBuckets {
        let categories = strings(categories);
        let build = build_matrix(
            &strings(responses),
            &categories,
            &model(),
            Metric::Distance,
            None,
        )
        .unwrap();
        assign_and_rank(&build.matrix, &build.retained, &categories, Metric::Distance)
    }

    #[test]
    fn every_declared_category_gets_a_bucket() {
        let buckets = buckets_for(&["clean park"], &["cleanliness", "safety", "Novel"]);
        assert_eq!(buckets.len(), 3);
        assert!(buckets.contains_key("cleanliness"));
        assert!(buckets.contains_key("safety"));
        assert!(buckets["Novel"].is_empty());
    }

    #[test]
    fn responses_land_in_their_best_category() {
        let buckets = buckets_for(
            &["the park was clean", "unsafe park"],
            &["cleanliness", "safety"],
        );
        assert_eq!(buckets["cleanliness"].len(), 1);
        assert_eq!(buckets["cleanliness"][0].response, "the park was clean");
        assert_eq!(buckets["safety"].len(), 1);
        assert_eq!(buckets["safety"][0].response, "unsafe park");
    }

    #[test]
    fn earliest_category_wins_ties() {
        // Both labels share the same vector, so every score ties exactly.
        let buckets = buckets_for(&["clean park"], &["clean", "cleanliness"]);
        assert_eq!(buckets["clean"].len(), 1);
        assert!(buckets["cleanliness"].is_empty());
    }

    #[test]
    fn exhausted_vocabulary_maps_to_the_sentinel() {
        // No response token survives stopword stripping and vocabulary
        // filtering, so every distance is infinite and the first declared
        // category wins with the sentinel score.
        let buckets = buckets_for(&["zzzz qqqq"], &["cleanliness", "safety"]);
        assert_eq!(buckets["cleanliness"].len(), 1);
        assert_eq!(buckets["cleanliness"][0].score, DISTANCE_SENTINEL);
    }

    #[test]
    fn buckets_sort_ascending_by_score() {
        let buckets = buckets_for(
            &["unsafe park", "clean park", "clean"],
            &["cleanliness", "Novel"],
        );
        let scores: Vec<f32> = buckets["cleanliness"]
            .iter()
            .map(|entry| entry.score)
            .collect();
        let mut sorted = scores.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(scores, sorted);
        assert_eq!(buckets["cleanliness"][0].response, "clean");
    }

    #[test]
    fn novel_bucket_keeps_encounter_order() {
        // Novel declared first, so vocabulary-exhausted rows fall into it
        // in encounter order regardless of score.
        let buckets = buckets_for(
            &["zzzz", "clean park", "qqqq"],
            &["Novel", "cleanliness"],
        );
        let novel: Vec<&str> = buckets["Novel"]
            .iter()
            .map(|entry| entry.response.as_str())
            .collect();
        assert_eq!(novel, vec!["zzzz", "qqqq"]);
        assert_eq!(buckets["cleanliness"].len(), 1);
    }

    #[test]
    fn similarity_metric_arg_maxes() {
        let categories = strings(&["park", "safety"]);
        let build = build_matrix(
            &strings(&["clean park"]),
            &categories,
            &model(),
            Metric::Similarity,
            None,
        )
        .unwrap();
        let buckets =
            assign_and_rank(&build.matrix, &build.retained, &categories, Metric::Similarity);
        assert_eq!(buckets["park"].len(), 1);
        assert!(buckets["safety"].is_empty());
    }

    #[test]
    fn stable_sort_preserves_insertion_order_on_equal_scores() {
        let buckets = buckets_for(&["clean", "clean\n"], &["cleanliness"]);
        assert_eq!(buckets["cleanliness"][0].response, "clean");
        assert_eq!(buckets["cleanliness"][1].response, "clean\n");
    }
}
