//! Pre-trained word-embedding model: vocabulary table, loaders, and the
//! bag-of-words query operations the metrics are built on.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use tracing::info;

use crate::error::{Error, Result};

/// Query surface of a loaded embedding model.
///
/// The model is read-only for the duration of a categorization run. Both
/// query operations must tolerate empty bags: `similarity` returns `0.0`
/// and `distance` returns `f32::INFINITY` rather than failing.
pub trait EmbeddingModel {
    /// Vocabulary membership test.
    fn contains(&self, word: &str) -> bool;

    /// Normalized cosine-style similarity between two bags of words.
    /// Higher means more similar; `0.0` when either bag is empty.
    fn similarity(&self, words_a: &[&str], words_b: &[&str]) -> f32;

    /// Transportation-style distance between two bags of words. Lower means
    /// more similar; `f32::INFINITY` when either bag has no in-vocabulary
    /// tokens.
    fn distance(&self, words_a: &[&str], words_b: &[&str]) -> f32;
}

/// In-memory token → vector table in word2vec shape.
///
/// Vectors are unit-normalized at insertion so cosine and euclidean
/// queries work directly on stored values.
#[derive(Debug)]
pub struct WordEmbeddings {
    dimension: usize,
    vectors: HashMap<String, Vec<f32>>,
}

impl WordEmbeddings {
    /// Builds a table from in-memory entries. Every vector must match
    /// `dimension`.
    pub fn from_entries<I>(dimension: usize, entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, Vec<f32>)>,
    {
        if dimension == 0 {
            return Err(Error::model_load("the embedding dimension must be non-zero"));
        }

        let mut model = WordEmbeddings {
            dimension,
            vectors: HashMap::new(),
        };

        for (word, vector) in entries {
            model.insert(word, vector)?;
        }

        Ok(model)
    }

    /// Loads a word2vec-format model, dispatching on the file extension:
    /// `.bin` is read as the binary format, everything else as the text
    /// format. `limit` caps the number of vocabulary entries kept.
    pub fn load_word2vec(path: &Path, limit: Option<usize>) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();

        let model = if extension.eq_ignore_ascii_case("bin") {
            Self::load_word2vec_binary(path, limit)
        } else {
            Self::load_word2vec_text(path, limit)
        }?;

        info!(
            path = %path.display(),
            vocabulary = model.len(),
            dimension = model.dimension(),
            "word embedding model loaded"
        );
        Ok(model)
    }

    /// Loads the text word2vec format: an optional `count dimension` header
    /// line followed by one `word v1 v2 ...` line per vocabulary entry.
    pub fn load_word2vec_text(path: &Path, limit: Option<usize>) -> Result<Self> {
        let file = File::open(path).map_err(|err| {
            Error::model_load_with(format!("unable to open {}", path.display()), err)
        })?;
        let reader = BufReader::new(file);

        let mut model: Option<WordEmbeddings> = None;
        let mut first = true;

        for (line_number, line) in reader.lines().enumerate() {
            let line = line.map_err(|err| {
                Error::model_load_with(format!("unable to read {}", path.display()), err)
            })?;
            if line.trim().is_empty() {
                continue;
            }

            let mut fields = line.split_whitespace();
            let word = fields
                .next()
                .ok_or_else(|| Error::model_load("unexpected empty model line"))?;
            let values: Vec<&str> = fields.collect();

            if first {
                first = false;
                // Header line: exactly two integer fields, vocabulary count
                // then dimension.
                if values.len() == 1 {
                    if let (Ok(_count), Ok(dimension)) =
                        (word.parse::<usize>(), values[0].parse::<usize>())
                    {
                        if dimension == 0 {
                            return Err(Error::model_load(
                                "the model header declares a zero dimension",
                            ));
                        }
                        model = Some(WordEmbeddings {
                            dimension,
                            vectors: HashMap::new(),
                        });
                        continue;
                    }
                }
            }

            let table = match model.as_mut() {
                Some(table) => table,
                None => {
                    // Headerless file: infer the dimension from the first
                    // entry.
                    if values.is_empty() {
                        return Err(Error::model_load(format!(
                            "line {} of {} has no vector values",
                            line_number + 1,
                            path.display()
                        )));
                    }
                    model = Some(WordEmbeddings {
                        dimension: values.len(),
                        vectors: HashMap::new(),
                    });
                    model.as_mut().unwrap()
                }
            };

            if let Some(limit) = limit {
                if table.len() >= limit {
                    break;
                }
            }

            if values.len() != table.dimension {
                return Err(Error::model_load(format!(
                    "line {} of {} has {} values, expected {}",
                    line_number + 1,
                    path.display(),
                    values.len(),
                    table.dimension
                )));
            }

            let mut vector = Vec::with_capacity(table.dimension);
            for value in values {
                let parsed = value.parse::<f32>().map_err(|err| {
                    Error::model_load_with(
                        format!(
                            "line {} of {} contains a malformed value",
                            line_number + 1,
                            path.display()
                        ),
                        err,
                    )
                })?;
                vector.push(parsed);
            }

            table.insert(word.to_string(), vector)?;
        }

        match model {
            Some(model) if !model.is_empty() => Ok(model),
            _ => Err(Error::model_load(format!(
                "{} contains no vocabulary entries",
                path.display()
            ))),
        }
    }

    /// Loads the binary word2vec format: a `count dimension` header line
    /// followed by `word ` and `dimension` little-endian f32 values per
    /// entry.
    pub fn load_word2vec_binary(path: &Path, limit: Option<usize>) -> Result<Self> {
        let file = File::open(path).map_err(|err| {
            Error::model_load_with(format!("unable to open {}", path.display()), err)
        })?;
        let mut reader = BufReader::new(file);

        let mut header = Vec::new();
        reader.read_until(b'\n', &mut header).map_err(|err| {
            Error::model_load_with(format!("unable to read {}", path.display()), err)
        })?;
        let header = String::from_utf8(header)
            .map_err(|err| Error::model_load_with("the model header is not UTF-8", err))?;
        let mut fields = header.split_whitespace();
        let count: usize = fields
            .next()
            .and_then(|value| value.parse().ok())
            .ok_or_else(|| Error::model_load("the model header lacks a vocabulary count"))?;
        let dimension: usize = fields
            .next()
            .and_then(|value| value.parse().ok())
            .ok_or_else(|| Error::model_load("the model header lacks a dimension"))?;
        if dimension == 0 {
            return Err(Error::model_load("the model header declares a zero dimension"));
        }

        let mut model = WordEmbeddings {
            dimension,
            vectors: HashMap::new(),
        };
        let keep = limit.map_or(count, |limit| limit.min(count));

        let mut buffer = vec![0u8; dimension * 4];
        for _ in 0..count {
            if model.len() >= keep {
                break;
            }

            let mut word_bytes = Vec::new();
            reader.read_until(b' ', &mut word_bytes).map_err(|err| {
                Error::model_load_with(format!("unable to read {}", path.display()), err)
            })?;
            while word_bytes.first().is_some_and(|&b| b == b'\n' || b == b'\r') {
                word_bytes.remove(0);
            }
            if word_bytes.last() == Some(&b' ') {
                word_bytes.pop();
            }
            if word_bytes.is_empty() {
                return Err(Error::model_load(format!(
                    "{} ended before the declared vocabulary count",
                    path.display()
                )));
            }
            let word = String::from_utf8(word_bytes).map_err(|err| {
                Error::model_load_with("a vocabulary entry is not UTF-8", err)
            })?;

            reader.read_exact(&mut buffer).map_err(|err| {
                Error::model_load_with(
                    format!("{} is truncated mid-vector", path.display()),
                    err,
                )
            })?;
            let vector: Vec<f32> = buffer
                .chunks_exact(4)
                .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
                .collect();

            model.insert(word, vector)?;
        }

        if model.is_empty() {
            return Err(Error::model_load(format!(
                "{} contains no vocabulary entries",
                path.display()
            )));
        }

        Ok(model)
    }

    /// The fixed vector length of every entry.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of vocabulary entries.
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    fn insert(&mut self, word: String, mut vector: Vec<f32>) -> Result<()> {
        if vector.len() != self.dimension {
            return Err(Error::model_load(format!(
                "the vector for {:?} has {} values, expected {}",
                word,
                vector.len(),
                self.dimension
            )));
        }

        let norm = vector
            .iter()
            .map(|&value| f64::from(value) * f64::from(value))
            .sum::<f64>()
            .sqrt();
        if norm > 0.0 {
            for value in &mut vector {
                *value = (f64::from(*value) / norm) as f32;
            }
        }

        // First occurrence wins when a model file repeats a word.
        self.vectors.entry(word).or_insert(vector);
        Ok(())
    }

    fn in_vocabulary_vectors(&self, words: &[&str]) -> Vec<&[f32]> {
        words
            .iter()
            .filter_map(|word| self.vectors.get(*word).map(Vec::as_slice))
            .collect()
    }

    fn mean_vector(&self, vectors: &[&[f32]]) -> Option<Vec<f32>> {
        if vectors.is_empty() {
            return None;
        }

        let mut mean = vec![0.0f32; self.dimension];
        for vector in vectors {
            for (slot, value) in mean.iter_mut().zip(vector.iter()) {
                *slot += value;
            }
        }
        let count = vectors.len() as f32;
        for slot in &mut mean {
            *slot /= count;
        }
        Some(mean)
    }
}

impl EmbeddingModel for WordEmbeddings {
    fn contains(&self, word: &str) -> bool {
        self.vectors.contains_key(word)
    }

    fn similarity(&self, words_a: &[&str], words_b: &[&str]) -> f32 {
        let vectors_a = self.in_vocabulary_vectors(words_a);
        let vectors_b = self.in_vocabulary_vectors(words_b);

        let (Some(mean_a), Some(mean_b)) =
            (self.mean_vector(&vectors_a), self.mean_vector(&vectors_b))
        else {
            return 0.0;
        };

        cosine_similarity(&mean_a, &mean_b).unwrap_or(0.0)
    }

    fn distance(&self, words_a: &[&str], words_b: &[&str]) -> f32 {
        let vectors_a = self.in_vocabulary_vectors(words_a);
        let vectors_b = self.in_vocabulary_vectors(words_b);

        if vectors_a.is_empty() || vectors_b.is_empty() {
            return f32::INFINITY;
        }

        directed_transport_cost(&vectors_a, &vectors_b)
            .max(directed_transport_cost(&vectors_b, &vectors_a))
    }
}

/// Mean nearest-neighbor transport cost of moving every vector in `from`
/// onto its closest vector in `to`.
fn directed_transport_cost(from: &[&[f32]], to: &[&[f32]]) -> f32 {
    let total: f32 = from
        .iter()
        .map(|source| {
            to.iter()
                .map(|target| euclidean_distance(source, target))
                .fold(f32::INFINITY, f32::min)
        })
        .sum();
    total / from.len() as f32
}

fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
    let sum: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(&x, &y)| {
            let diff = f64::from(x) - f64::from(y);
            diff * diff
        })
        .sum();
    sum.sqrt() as f32
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f32> {
    if a.len() != b.len() || a.is_empty() {
        return None;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (&x, &y) in a.iter().zip(b.iter()) {
        let xf = f64::from(x);
        let yf = f64::from(y);
        dot += xf * yf;
        norm_a += xf * xf;
        norm_b += yf * yf;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return None;
    }

    Some((dot / (norm_a.sqrt() * norm_b.sqrt())) as f32)
}
