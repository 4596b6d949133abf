// src/stopwords.rs
//! Stopword set assembled once at construction and never mutated afterwards.
//!
//! Contents: base list + every base word with the `NEG_` prefix + suffix artifacts
//! left over by tokenization (`'nt`, ordinals, retweet marker) + every emoji token.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::Context;
use once_cell::sync::Lazy;

use crate::emoji::EmojiLexicon;
use crate::negation::NEG_PREFIX;

pub const SUFFIX_ARTIFACTS: &[&str] = &["'nt", "st", "nd", "rd", "th", "rt"];

static ENGLISH: Lazy<Vec<String>> = Lazy::new(|| parse_list(include_str!("../data/stopwords_en.txt")));

/// Built-in English base list.
pub fn english() -> &'static [String] {
    ENGLISH.as_slice()
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Read a custom base list (one word per line).
pub fn load_base_list(path: &Path) -> anyhow::Result<Vec<String>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading stopwords from {}", path.display()))?;
    Ok(parse_list(&raw))
}

#[derive(Debug, Clone, Default)]
pub struct StopwordSet {
    words: HashSet<String>,
}

impl StopwordSet {
    pub fn assemble<S: AsRef<str>>(base: &[S], emoji: &EmojiLexicon) -> Self {
        let mut words = HashSet::with_capacity(base.len() * 2 + SUFFIX_ARTIFACTS.len() + emoji.len());
        for w in base {
            let w = w.as_ref();
            words.insert(w.to_string());
            words.insert(format!("{NEG_PREFIX}{w}"));
        }
        words.extend(SUFFIX_ARTIFACTS.iter().map(|s| s.to_string()));
        words.extend(emoji.all_tokens().iter().cloned());
        Self { words }
    }

    pub fn english(emoji: &EmojiLexicon) -> Self {
        Self::assemble(english(), emoji)
    }

    pub fn contains(&self, token: &str) -> bool {
        self.words.contains(token)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
