//! Dense response × category score matrix.

use std::time::Instant;

use tracing::debug;

use crate::engine::CancelFlag;
use crate::error::{Error, Result};
use crate::metric::Metric;
use crate::model::EmbeddingModel;

/// Initial cell value, distinguishing untouched cells from computed scores.
/// Every cell must be overwritten by the exhaustive sweep.
pub const UNSCORED: f32 = -1.0;

/// Row-major score grid: one row per retained response, one column per
/// category in declared order.
#[derive(Debug, Clone)]
pub struct SimilarityMatrix {
    rows: usize,
    columns: usize,
    cells: Vec<f32>,
}

impl SimilarityMatrix {
    fn new(rows: usize, columns: usize) -> Self {
        SimilarityMatrix {
            rows,
            columns,
            cells: vec![UNSCORED; rows * columns],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn get(&self, row: usize, column: usize) -> f32 {
        self.cells[row * self.columns + column]
    }

    fn set(&mut self, row: usize, column: usize, value: f32) {
        self.cells[row * self.columns + column] = value;
    }

    /// One row of scores, aligned with the declared category order.
    pub fn row(&self, row: usize) -> &[f32] {
        let start = row * self.columns;
        &self.cells[start..start + self.columns]
    }

    /// Count of cells still holding the [`UNSCORED`] sentinel.
    pub fn unscored_cells(&self) -> usize {
        self.cells.iter().filter(|&&value| value == UNSCORED).count()
    }
}

/// Matrix plus the responses that actually consumed a row.
#[derive(Debug)]
pub struct MatrixBuild {
    pub matrix: SimilarityMatrix,
    /// Non-blank responses in encounter order; index i is matrix row i.
    pub retained: Vec<String>,
}

/// Computes the score between every retained response and every category
/// label with the run's metric.
///
/// Blank responses (pure whitespace) are skipped and consume no row. The
/// sweep is exhaustive by design so every response gets a complete,
/// comparable score vector.
pub fn build_matrix(
    responses: &[String],
    categories: &[String],
    model: &dyn EmbeddingModel,
    metric: Metric,
    cancel: Option<&CancelFlag>,
) -> Result<MatrixBuild> {
    let retained: Vec<String> = responses
        .iter()
        .filter(|response| !response.trim().is_empty())
        .cloned()
        .collect();

    let mut matrix = SimilarityMatrix::new(retained.len(), categories.len());

    let started = Instant::now();
    for (row, response) in retained.iter().enumerate() {
        if let Some(cancel) = cancel {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
        }

        for (column, category) in categories.iter().enumerate() {
            matrix.set(row, column, metric.score(response, category, model));
        }
    }

    debug_assert_eq!(matrix.unscored_cells(), 0, "incomplete matrix sweep");
    debug!(
        rows = matrix.rows(),
        columns = matrix.columns(),
        elapsed_secs = started.elapsed().as_secs_f64(),
        "similarity matrix populated"
    );

    Ok(MatrixBuild { matrix, retained })
}
