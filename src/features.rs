// src/features.rs
//! Per-tweet feature assembly.
//!
//! Each document is processed independently against read-only resources:
//! - counts over the **raw** text (emoji, uppercase words, `!`)
//! - `clean_text`: normalize → tokenize → collapse repeats → stem → mark negation → drop stopwords
//! - `embedding`: mean of the unit vectors of `clean_text` tokens (zero vector if none is known)

use std::collections::HashSet;
use std::time::Instant;

use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::embedding::EmbeddingLookup;
use crate::emoji::EmojiLexicon;
use crate::negation::NegationScopeMarker;
use crate::normalize::{tokenize, RegexNormalizer};
use crate::repeat::{self, LexicalOracle, RepeatCollapser};
use crate::stem::PorterStemmer;
use crate::stopwords::StopwordSet;

/// One-time metrics registration.
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("features_documents_total", "Documents turned into feature records.");
        describe_counter!(
            "features_oov_tokens_total",
            "clean_text tokens missing from the embedding table."
        );
        describe_counter!(
            "features_empty_clean_text_total",
            "Documents whose clean_text came out empty."
        );
    });
}

/// Short anonymized id for logs; raw text is never logged.
pub(crate) fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let digest = Sha256::digest(text.as_bytes());
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

/// Output row consumed by the downstream feature union / classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub pos_emoji_count: u32,
    pub neg_emoji_count: u32,
    pub uppercase_word_count: u32,
    pub exclamation_count: u32,
    pub question_mark_count: u32,
    pub clean_text: String,
    pub embedding: Vec<f32>,
}

pub struct FeatureAssembler {
    normalizer: RegexNormalizer,
    collapser: RepeatCollapser<Box<dyn LexicalOracle>>,
    stemmer: PorterStemmer,
    negation: NegationScopeMarker,
    emoji: EmojiLexicon,
    stopwords: StopwordSet,
    embeddings: EmbeddingLookup,
}

impl FeatureAssembler {
    /// English stopwords and word list, default negation window.
    pub fn new(embeddings: EmbeddingLookup, emoji: EmojiLexicon) -> Self {
        let stopwords = StopwordSet::english(&emoji);
        let oracle: Box<dyn LexicalOracle> = Box::new(repeat::english());
        Self {
            normalizer: RegexNormalizer::default(),
            collapser: RepeatCollapser::new(oracle),
            stemmer: PorterStemmer::default(),
            negation: NegationScopeMarker::default(),
            emoji,
            stopwords,
            embeddings,
        }
    }

    pub fn with_oracle<O: LexicalOracle + 'static>(mut self, oracle: O) -> Self {
        let oracle: Box<dyn LexicalOracle> = Box::new(oracle);
        self.collapser = RepeatCollapser::new(oracle);
        self
    }

    /// Replace the base stopword list; augmentations are re-derived from it.
    pub fn with_stopword_base<S: AsRef<str>>(mut self, base: &[S]) -> Self {
        self.stopwords = StopwordSet::assemble(base, &self.emoji);
        self
    }

    pub fn with_negation_window(mut self, window: usize) -> Self {
        self.negation = NegationScopeMarker::new(window);
        self
    }

    pub fn with_normalizer(mut self, normalizer: RegexNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn dimension(&self) -> usize {
        self.embeddings.dimension()
    }

    pub fn embeddings(&self) -> &EmbeddingLookup {
        &self.embeddings
    }

    pub fn stopwords(&self) -> &StopwordSet {
        &self.stopwords
    }

    /// Full cleaning pipeline; may return an empty string.
    pub fn clean_text(&self, text: &str) -> String {
        let normalized = self.normalizer.normalize(text);
        let tokens: Vec<String> = tokenize(&normalized)
            .iter()
            .map(|t| self.stemmer.stem(&self.collapser.collapse(t)))
            .collect();
        let marked = self.negation.mark(tokens);
        marked
            .into_iter()
            .filter(|t| !self.stopwords.contains(t))
            .collect::<Vec<_>>()
            .join(" ")
            .trim()
            .to_string()
    }

    /// Mean embedding of the (lower-cased) tokens of `clean_text`; zero vector if none is known.
    pub fn embed(&self, clean_text: &str) -> Vec<f32> {
        let dim = self.embeddings.dimension();
        let mut sum = vec![0.0f32; dim];
        let mut found = 0usize;
        let mut oov = 0u64;
        for word in clean_text.split_whitespace() {
            match self.embeddings.vector_of(&word.to_lowercase()) {
                Some(v) => {
                    for (acc, x) in sum.iter_mut().zip(v) {
                        *acc += x;
                    }
                    found += 1;
                }
                None => oov += 1,
            }
        }
        counter!("features_oov_tokens_total").increment(oov);
        if found == 0 {
            return sum;
        }
        let n = found as f32;
        for x in &mut sum {
            *x /= n;
        }
        sum
    }

    /// Similarity of every token of `text` to `target`, deduplicated by value, then
    /// min-max normalized and averaged. `None` when no token is in vocabulary.
    pub fn average_similarity(&self, text: &str, target: &str) -> Option<f32> {
        let mut seen = HashSet::new();
        let mut sims = Vec::new();
        for word in text.split(' ') {
            if let Some(sim) = self.embeddings.similarity_of(target, &word.to_lowercase()) {
                // -0.0 and 0.0 are the same value
                let sim = if sim == 0.0 { 0.0 } else { sim };
                if seen.insert(sim.to_bits()) {
                    sims.push(sim);
                }
            }
        }
        match sims.len() {
            0 => None,
            1 => Some(sims[0]),
            n => {
                let min = sims.iter().copied().fold(f32::INFINITY, f32::min);
                let max = sims.iter().copied().fold(f32::NEG_INFINITY, f32::max);
                let span = max - min;
                let total: f32 = sims.iter().map(|s| (s - min) / span).sum();
                Some(total / n as f32)
            }
        }
    }

    pub fn extract(&self, text: &str) -> FeatureRecord {
        ensure_metrics_described();
        let (pos, neg) = self.emoji.count_in(text);
        let clean_text = self.clean_text(text);
        let embedding = self.embed(&clean_text);

        counter!("features_documents_total").increment(1);
        if clean_text.is_empty() {
            counter!("features_empty_clean_text_total").increment(1);
        }
        debug!(
            target: "features",
            id = %anon_hash(text),
            tokens = clean_text.split_whitespace().count(),
            "document extracted"
        );

        FeatureRecord {
            pos_emoji_count: pos as u32,
            neg_emoji_count: neg as u32,
            uppercase_word_count: count_uppercase_words(text),
            exclamation_count: count_exclamations(text),
            question_mark_count: count_question_marks(text),
            clean_text,
            embedding,
        }
    }

    /// Records in input order.
    pub fn transform<S: AsRef<str>>(&self, texts: &[S]) -> Vec<FeatureRecord> {
        let started = Instant::now();
        let out: Vec<FeatureRecord> = texts.iter().map(|t| self.extract(t.as_ref())).collect();
        info!(
            target: "features",
            documents = out.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "batch transformed"
        );
        out
    }

    /// Same as `transform`, spread over the rayon pool. Order is preserved.
    pub fn transform_parallel<S: AsRef<str> + Sync>(&self, texts: &[S]) -> Vec<FeatureRecord> {
        let started = Instant::now();
        let out: Vec<FeatureRecord> = texts
            .par_iter()
            .map(|t| self.extract(t.as_ref()))
            .collect();
        info!(
            target: "features",
            documents = out.len(),
            threads = rayon::current_num_threads(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "batch transformed in parallel"
        );
        out
    }
}

/// Tokens split on single spaces that equal their own upper-cased form.
/// Punctuation-only and empty tokens count too.
pub fn count_uppercase_words(text: &str) -> u32 {
    text.split(' ').filter(|w| *w == w.to_uppercase()).count() as u32
}

pub fn count_exclamations(text: &str) -> u32 {
    text.chars().filter(|&c| c == '!').count() as u32
}

/// Counts `!`, not `?`: the trained model was fitted on this exact column.
pub fn count_question_marks(text: &str) -> u32 {
    count_exclamations(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    use crate::repeat::WordList;

    fn assembler() -> FeatureAssembler {
        let table = "love 1 0\nday 0 1\ncat 1 1\n";
        let emb = EmbeddingLookup::from_reader(Cursor::new(table), 2).unwrap();
        let emoji = EmojiLexicon::new(["😊"], ["😢"]);
        FeatureAssembler::new(emb, emoji)
            .with_oracle(WordList::from_words(["happy", "stop", "cannot", "good"]))
    }

    #[test]
    fn counts_on_raw_text() {
        let a = assembler();
        let r = a.extract("great 😊 day 😊");
        assert_eq!(r.pos_emoji_count, 2);
        assert_eq!(r.neg_emoji_count, 0);

        let r = a.extract("wow!! really?");
        assert_eq!(r.exclamation_count, 2);
        assert_eq!(r.question_mark_count, 2);
    }

    #[test]
    fn uppercase_counts_punctuation_tokens() {
        assert_eq!(count_uppercase_words("OMG this is GREAT !!"), 3);
        assert_eq!(count_uppercase_words("... ?"), 2);
        assert_eq!(count_uppercase_words("hello world"), 0);
        // consecutive spaces leave an empty token, which equals its upper-case
        assert_eq!(count_uppercase_words("a  b"), 1);
    }

    #[test]
    fn clean_text_pipeline() {
        let a = assembler();
        let out = a.clean_text("I can't stop LOOOVING this!!! http://t.co/x @bob #happy");
        // "this" stems to "thi", which is not a stopword
        assert_eq!(out, "cannot stop love thi happi");
    }

    #[test]
    fn default_word_list_protects_real_doubles() {
        let a = FeatureAssembler::new(EmbeddingLookup::empty(2), EmojiLexicon::default());
        assert_eq!(a.clean_text("good coffee all week"), "good coffe week");
        assert_eq!(a.clean_text("I will see you too"), "");
        assert_eq!(a.clean_text("soooo goooood"), "good");
    }

    #[test]
    fn negation_survives_stopword_filter() {
        let a = assembler();
        assert_eq!(a.clean_text("I do not like it"), "NEG_like");
    }

    #[test]
    fn cleaning_is_idempotent_on_clean_input() {
        let a = assembler();
        let once = a.clean_text("cat dog sun");
        assert_eq!(once, "cat dog sun");
        assert_eq!(a.clean_text(&once), once);
    }

    #[test]
    fn embedding_is_mean_or_zero() {
        let a = assembler();
        let v = a.embed("love day unknown");
        assert!((v[0] - 0.5).abs() < 1e-6 && (v[1] - 0.5).abs() < 1e-6);

        let z = a.embed("nothing here known");
        assert_eq!(z, vec![0.0, 0.0]);
        assert_eq!(a.embed(""), vec![0.0, 0.0]);
    }

    #[test]
    fn empty_text_is_valid() {
        let a = assembler();
        let r = a.extract("");
        assert_eq!(r.clean_text, "");
        assert_eq!(r.embedding, vec![0.0, 0.0]);
        assert_eq!(r.exclamation_count, 0);
    }

    #[test]
    fn average_similarity_dedups_and_normalizes() {
        let a = assembler();
        assert_eq!(a.average_similarity("zzz qqq", "love"), None);
        assert_eq!(a.average_similarity("unknown", "zzz"), None);
        // a single distinct value is returned as-is, duplicates collapse
        let s = a.average_similarity("love LOVE", "love").unwrap();
        assert!((s - 1.0).abs() < 1e-6);
        // {1.0, 0.0, 0.7071} → normalized {1, 0, 0.7071} → mean
        let s = a.average_similarity("love day cat", "love").unwrap();
        let expected = (1.0 + 0.0 + std::f32::consts::FRAC_1_SQRT_2) / 3.0;
        assert!((s - expected).abs() < 1e-5);
    }

    #[test]
    fn parallel_matches_sequential() {
        let a = assembler();
        let docs = vec!["I love this day!", "not good at all 😢", "", "CAT!!"];
        assert_eq!(a.transform(&docs), a.transform_parallel(&docs));
        assert_eq!(a.transform(&docs).len(), 4);
    }
}
