// src/emoji.rs
//! Positive / negative emoji lexicon loaded from JSON:
//!
//! ```json
//! { "positive": ["😊", ":)"], "negative": ["😢", ":("] }
//! ```
//!
//! Membership is exact; no substring matching. The two lists are assumed disjoint.

use anyhow::Context;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct LexiconFile {
    #[serde(default)]
    positive: Vec<String>,
    #[serde(default)]
    negative: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct EmojiLexicon {
    positive: HashSet<String>,
    negative: HashSet<String>,
    // file order, positive first; used to seed stopwords
    ordered: Vec<String>,
}

impl EmojiLexicon {
    pub fn new<P, N>(positive: P, negative: N) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
        N: IntoIterator,
        N::Item: Into<String>,
    {
        let positive: Vec<String> = positive.into_iter().map(Into::into).collect();
        let negative: Vec<String> = negative.into_iter().map(Into::into).collect();
        let ordered = positive.iter().chain(negative.iter()).cloned().collect();
        Self {
            positive: positive.into_iter().collect(),
            negative: negative.into_iter().collect(),
            ordered,
        }
    }

    pub fn from_json_str(s: &str) -> anyhow::Result<Self> {
        let file: LexiconFile = serde_json::from_str(s).context("parsing emoji lexicon JSON")?;
        Ok(Self::new(file.positive, file.negative))
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading emoji lexicon from {}", path.display()))?;
        Self::from_json_str(&content).with_context(|| format!("in {}", path.display()))
    }

    pub fn is_positive(&self, token: &str) -> bool {
        self.positive.contains(token)
    }

    pub fn is_negative(&self, token: &str) -> bool {
        self.negative.contains(token)
    }

    /// Returns `(positive, negative)`. Tokens are split on single spaces and trimmed.
    pub fn count_in(&self, text: &str) -> (usize, usize) {
        let mut pos = 0usize;
        let mut neg = 0usize;
        for word in text.split(' ') {
            let word = word.trim();
            if self.is_positive(word) {
                pos += 1;
            } else if self.is_negative(word) {
                neg += 1;
            }
        }
        (pos, neg)
    }

    /// Every lexicon token, positive list first.
    pub fn all_tokens(&self) -> &[String] {
        &self.ordered
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}
