// src/embedding.rs
//! Pretrained word-vector table (GloVe / word2vec text format).
//!
//! Rows are `token v1 v2 … vN`. An optional word2vec header line `count dim` is skipped.
//! Every vector is scaled to unit length once at load, so similarity is a plain dot product.
//! Lookups never fail: out-of-vocabulary tokens yield `None`.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Instant;

use anyhow::Context;
use tracing::info;

use crate::error::ResourceError;

pub const DEFAULT_DIMENSION: usize = 200;

#[derive(Debug, Clone)]
pub struct EmbeddingLookup {
    dimension: usize,
    index: HashMap<String, usize>,
    // row-major, `index.len() * dimension`
    matrix: Vec<f32>,
}

impl EmbeddingLookup {
    /// Build from already-parsed rows. Rows are normalized here.
    pub fn from_rows<I>(dimension: usize, rows: I) -> Result<Self, ResourceError>
    where
        I: IntoIterator<Item = (String, Vec<f32>)>,
    {
        if dimension == 0 {
            return Err(ResourceError::ZeroDimension);
        }
        let mut table = Self {
            dimension,
            index: HashMap::new(),
            matrix: Vec::new(),
        };
        for (i, (word, vector)) in rows.into_iter().enumerate() {
            if vector.len() != dimension {
                return Err(ResourceError::Dimension {
                    line: i + 1,
                    expected: dimension,
                    found: vector.len(),
                });
            }
            table.insert(word, vector);
        }
        Ok(table)
    }

    /// An empty table; every lookup is OOV. Used when no embedding file is configured.
    pub fn empty(dimension: usize) -> Self {
        Self {
            dimension,
            index: HashMap::new(),
            matrix: Vec::new(),
        }
    }

    /// Parse the text format from any reader.
    pub fn from_reader<R: BufRead>(reader: R, dimension: usize) -> anyhow::Result<Self> {
        if dimension == 0 {
            return Err(ResourceError::ZeroDimension.into());
        }
        let mut table = Self::empty(dimension);
        for (i, line) in reader.lines().enumerate() {
            let line = line.with_context(|| format!("reading embedding line {}", i + 1))?;
            let line = line.trim_end();
            if line.is_empty() || (i == 0 && is_header(line)) {
                continue;
            }
            let mut parts = line.split(' ').filter(|p| !p.is_empty());
            let Some(word) = parts.next() else {
                continue;
            };
            let vector = parts
                .map(|v| {
                    v.parse::<f32>().map_err(|_| ResourceError::BadFloat {
                        line: i + 1,
                        value: v.to_string(),
                    })
                })
                .collect::<Result<Vec<f32>, _>>()?;
            if vector.len() != dimension {
                return Err(ResourceError::Dimension {
                    line: i + 1,
                    expected: dimension,
                    found: vector.len(),
                }
                .into());
            }
            table.insert(word.to_string(), vector);
        }
        if table.is_empty() {
            return Err(ResourceError::EmptyTable.into());
        }
        Ok(table)
    }

    pub fn load(path: &Path, dimension: usize) -> anyhow::Result<Self> {
        let started = Instant::now();
        let file = File::open(path)
            .with_context(|| format!("opening embedding table {}", path.display()))?;
        let table = Self::from_reader(BufReader::new(file), dimension)
            .with_context(|| format!("loading embedding table {}", path.display()))?;
        info!(
            target: "features",
            path = %path.display(),
            words = table.len(),
            dimension,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "embedding table loaded"
        );
        Ok(table)
    }

    // Later duplicates overwrite earlier rows.
    fn insert(&mut self, word: String, mut vector: Vec<f32>) {
        normalize_in_place(&mut vector);
        match self.index.get(&word) {
            Some(&row) => {
                let start = row * self.dimension;
                self.matrix[start..start + self.dimension].copy_from_slice(&vector);
            }
            None => {
                self.index.insert(word, self.index.len());
                self.matrix.extend_from_slice(&vector);
            }
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.index.contains_key(token)
    }

    /// Unit-length vector for `token`, or `None` when out of vocabulary.
    pub fn vector_of(&self, token: &str) -> Option<&[f32]> {
        let row = *self.index.get(token)?;
        let start = row * self.dimension;
        Some(&self.matrix[start..start + self.dimension])
    }

    /// Cosine similarity in `[-1, 1]`, or `None` if either token is OOV.
    pub fn similarity_of(&self, a: &str, b: &str) -> Option<f32> {
        let va = self.vector_of(a)?;
        let vb = self.vector_of(b)?;
        let dot: f32 = va.iter().zip(vb).map(|(x, y)| x * y).sum();
        Some(dot.clamp(-1.0, 1.0))
    }
}

fn is_header(line: &str) -> bool {
    let mut it = line.split_whitespace();
    matches!(
        (it.next(), it.next(), it.next()),
        (Some(a), Some(b), None) if a.parse::<usize>().is_ok() && b.parse::<usize>().is_ok()
    )
}

/// Scale to unit L2 norm. Zero vectors stay zero.
fn normalize_in_place(v: &mut [f32]) {
    let norm2: f64 = v.iter().map(|&x| f64::from(x) * f64::from(x)).sum();
    if norm2 > 0.0 {
        let inv = norm2.sqrt().recip() as f32;
        for x in v.iter_mut() {
            *x *= inv;
        }
    }
}
