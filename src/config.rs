// src/config.rs
//! Feature extractor configuration (TOML) and resource loading.
//!
//! Shape:
//! ```toml
//! embedding_path = "data/glove.twitter.27B.200d.txt"   # optional
//! emoji_path = "data/emoji.json"
//! vocabulary_path = "data/words_en.txt"                # optional, built-in English word list if absent
//! stopwords_path = "data/stopwords_en.txt"             # optional, built-in English if absent
//! dimension = 200
//! negation_window = 4
//! ```
//!
//! Path resolution: `$FEATURES_CONFIG_PATH` or `config/features.toml`.
//! `$FEATURES_EMBEDDING_PATH` / `$FEATURES_EMBEDDING_DIM` override the file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use tracing::{info, warn};

use crate::embedding::{EmbeddingLookup, DEFAULT_DIMENSION};
use crate::emoji::EmojiLexicon;
use crate::features::FeatureAssembler;
use crate::negation::DEFAULT_NEGATION_WINDOW;
use crate::repeat::{self, WordList};
use crate::stopwords;

pub const DEFAULT_FEATURES_CONFIG_PATH: &str = "config/features.toml";
pub const ENV_FEATURES_CONFIG_PATH: &str = "FEATURES_CONFIG_PATH";
pub const ENV_EMBEDDING_PATH: &str = "FEATURES_EMBEDDING_PATH";
pub const ENV_EMBEDDING_DIM: &str = "FEATURES_EMBEDDING_DIM";

fn default_dimension() -> usize {
    DEFAULT_DIMENSION
}
fn default_negation_window() -> usize {
    DEFAULT_NEGATION_WINDOW
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct FeatureConfig {
    #[serde(default)]
    pub embedding_path: Option<PathBuf>,
    pub emoji_path: PathBuf,
    #[serde(default)]
    pub vocabulary_path: Option<PathBuf>,
    #[serde(default)]
    pub stopwords_path: Option<PathBuf>,
    #[serde(default = "default_dimension")]
    pub dimension: usize,
    #[serde(default = "default_negation_window")]
    pub negation_window: usize,
}

impl FeatureConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: FeatureConfig = toml::from_str(s).context("parsing feature config")?;
        if cfg.dimension == 0 {
            return Err(anyhow!("dimension must be > 0"));
        }
        Ok(cfg)
    }

    /// Load from an explicit path. Relative resource paths resolve against the config's directory.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading feature config from {}", path.display()))?;
        let mut cfg = Self::from_toml_str(&content)
            .with_context(|| format!("in {}", path.display()))?;
        if let Some(base) = path.parent() {
            cfg.rebase(base);
        }
        Ok(cfg)
    }

    /// `$FEATURES_CONFIG_PATH` → `config/features.toml`, then env overrides.
    pub fn load_default() -> Result<Self> {
        let path = std::env::var(ENV_FEATURES_CONFIG_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_FEATURES_CONFIG_PATH));
        let mut cfg = Self::load_from(&path)?;
        cfg.apply_env_overrides();
        Ok(cfg)
    }

    pub fn apply_env_overrides(&mut self) {
        if let Ok(p) = std::env::var(ENV_EMBEDDING_PATH) {
            if !p.trim().is_empty() {
                self.embedding_path = Some(PathBuf::from(p.trim()));
            }
        }
        match parse_dimension_env(std::env::var(ENV_EMBEDDING_DIM).ok()) {
            Some(d) => self.dimension = d,
            None => {
                if std::env::var(ENV_EMBEDDING_DIM).is_ok() {
                    warn!(target: "features", "ignoring invalid {ENV_EMBEDDING_DIM}");
                }
            }
        }
    }

    fn rebase(&mut self, base: &Path) {
        let join = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        join(&mut self.emoji_path);
        for p in [
            &mut self.embedding_path,
            &mut self.vocabulary_path,
            &mut self.stopwords_path,
        ]
        .into_iter()
        .flatten()
        {
            join(p);
        }
    }
}

// positive integer only
fn parse_dimension_env(raw: Option<String>) -> Option<usize> {
    raw.and_then(|s| s.trim().parse::<usize>().ok())
        .filter(|&d| d > 0)
}

/// Already-parsed resources handed to the core.
#[derive(Debug)]
pub struct Resources {
    pub embeddings: EmbeddingLookup,
    pub emoji: EmojiLexicon,
    /// `None` keeps the built-in English word list.
    pub vocabulary: Option<WordList>,
    pub stopword_base: Vec<String>,
    pub negation_window: usize,
}

impl Resources {
    pub fn load(cfg: &FeatureConfig) -> Result<Self> {
        let embeddings = match &cfg.embedding_path {
            Some(p) => EmbeddingLookup::load(p, cfg.dimension)?,
            None => {
                warn!(target: "features", "no embedding table configured; embeddings will be zero");
                EmbeddingLookup::empty(cfg.dimension)
            }
        };
        let emoji = EmojiLexicon::load(&cfg.emoji_path)?;
        let vocabulary = cfg
            .vocabulary_path
            .as_deref()
            .map(WordList::load)
            .transpose()?;
        let stopword_base = match &cfg.stopwords_path {
            Some(p) => stopwords::load_base_list(p)?,
            None => stopwords::english().to_vec(),
        };
        info!(
            target: "features",
            words = embeddings.len(),
            dimension = embeddings.dimension(),
            emoji = emoji.len(),
            vocabulary = vocabulary.as_ref().map_or(repeat::english().len(), WordList::len),
            stopwords = stopword_base.len(),
            "resources loaded"
        );
        Ok(Self {
            embeddings,
            emoji,
            vocabulary,
            stopword_base,
            negation_window: cfg.negation_window,
        })
    }

    pub fn into_assembler(self) -> FeatureAssembler {
        let fx = FeatureAssembler::new(self.embeddings, self.emoji)
            .with_stopword_base(&self.stopword_base)
            .with_negation_window(self.negation_window);
        match self.vocabulary {
            Some(words) => fx.with_oracle(words),
            None => fx,
        }
    }
}
