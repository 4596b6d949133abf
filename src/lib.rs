// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod config;
pub mod embedding;
pub mod emoji;
pub mod error;
pub mod features;
pub mod negation;
pub mod normalize;
pub mod repeat;
pub mod stem;
pub mod stopwords;
pub mod stream;

// ---- Re-exports for stable public API ----
pub use crate::config::{FeatureConfig, Resources};
pub use crate::embedding::EmbeddingLookup;
pub use crate::emoji::EmojiLexicon;
pub use crate::error::ResourceError;
pub use crate::features::{FeatureAssembler, FeatureRecord};
pub use crate::negation::NegationScopeMarker;
pub use crate::normalize::RegexNormalizer;
pub use crate::repeat::{LexicalOracle, RepeatCollapser, WordList};
pub use crate::stem::PorterStemmer;
pub use crate::stopwords::StopwordSet;
