//! CSV export of a categorization result.
//!
//! One record per scored response with a fixed `domain, category,
//! response, score` header, for the spreadsheet-oriented consumers of the
//! result structure.

use std::io::Write;
use std::path::Path;

use crate::engine::CategorizationResult;
use crate::error::Result;

const EXPORT_HEADERS: [&str; 4] = ["domain", "category", "response", "score"];

/// Writes the flattened result to `writer` as CSV.
///
/// Buckets are emitted in result order; rows within a bucket keep the
/// bucket's ranked order. Empty buckets contribute no rows.
pub fn write_csv<W: Write>(result: &CategorizationResult, writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(EXPORT_HEADERS)?;

    for (domain, buckets) in result {
        for (category, entries) in buckets {
            for entry in entries {
                let score = entry.score.to_string();
                csv_writer.write_record([
                    domain.as_str(),
                    category.as_str(),
                    entry.response.as_str(),
                    score.as_str(),
                ])?;
            }
        }
    }

    csv_writer.flush()?;
    Ok(())
}

/// Writes the flattened result to a CSV file at `path`.
pub fn export_csv(result: &CategorizationResult, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_csv(result, file)
}
