//! Semantic categorization engine for free-text feedback responses.
//!
//! Given a set of free-text responses, per-domain category vocabularies,
//! and a pre-trained word-embedding model, the engine assigns every
//! response to the most semantically similar category in its domain and
//! produces a ranked, scored, JSON-serializable result.
//!
//! ```no_run
//! use std::collections::HashMap;
//! use std::path::Path;
//!
//! use feedback_match::{Categorizer, Domain, WordEmbeddings};
//!
//! # fn main() -> feedback_match::Result<()> {
//! let model = WordEmbeddings::load_word2vec(Path::new("model.bin"), Some(200_000))?;
//!
//! let domains = vec![Domain::new(
//!     "parks",
//!     vec!["cleanliness".into(), "safety".into(), "Novel".into()],
//! )];
//! let mut responses = HashMap::new();
//! responses.insert(
//!     "parks".to_string(),
//!     vec!["the park was very clean\n".to_string()],
//! );
//!
//! let results = Categorizer::new(&model).categorize(&domains, &responses)?;
//! println!("{}", serde_json::to_string_pretty(&results)?);
//! # Ok(())
//! # }
//! ```

pub mod assign;
pub mod engine;
pub mod error;
pub mod export;
pub mod matrix;
pub mod metric;
pub mod model;
pub mod normalize;
pub mod observer;
pub mod stopwords;

pub use assign::{assign_and_rank, CategoryBuckets, ScoredResponse, NOVEL_CATEGORY};
pub use engine::{CancelFlag, CategorizationResult, Categorizer, Domain};
pub use error::{Error, Result};
pub use export::{export_csv, write_csv};
pub use matrix::{build_matrix, MatrixBuild, SimilarityMatrix, UNSCORED};
pub use metric::{distance_score, similarity_score, Metric, DISTANCE_SENTINEL};
pub use model::{EmbeddingModel, WordEmbeddings};
pub use normalize::normalize;
pub use observer::{JsonDumpObserver, PhaseEvent, RunObserver, StatsFileObserver};
