// tests/features_e2e.rs
use std::path::Path;

use rand::{rngs::StdRng, Rng, SeedableRng};
use tweet_feature_extractor::features::count_uppercase_words;
use tweet_feature_extractor::{
    EmbeddingLookup, EmojiLexicon, FeatureAssembler, NegationScopeMarker, WordList,
};

fn fixture_assembler() -> FeatureAssembler {
    let emb = EmbeddingLookup::load(Path::new("tests/fixtures/vectors.txt"), 3).expect("vectors");
    let emoji = EmojiLexicon::load(Path::new("data/emoji.json")).expect("emoji");
    let words = WordList::load(Path::new("tests/fixtures/words.txt")).expect("words");
    FeatureAssembler::new(emb, emoji).with_oracle(words)
}

fn toks(s: &str) -> Vec<String> {
    s.split_whitespace().map(str::to_string).collect()
}

#[test]
fn negation_window_example() {
    let out = NegationScopeMarker::default().mark(toks("i do not like it"));
    assert_eq!(out, toks("i do NEG_not NEG_like NEG_it"));
}

#[test]
fn emoji_counting_example() {
    let fx = FeatureAssembler::new(EmbeddingLookup::empty(3), EmojiLexicon::new(["😊"], ["😢"]));
    let r = fx.extract("great 😊 day 😊");
    assert_eq!(r.pos_emoji_count, 2);
    assert_eq!(r.neg_emoji_count, 0);
}

#[test]
fn out_of_vocabulary_falls_back_to_zero_vector() {
    let fx = fixture_assembler();
    let r = fx.extract("zzz qqq xyzzy");
    assert_eq!(r.embedding, vec![0.0; 3]);
}

#[test]
fn question_mark_column_counts_exclamations() {
    let fx = fixture_assembler();
    let r = fx.extract("wow!! really?");
    assert_eq!(r.exclamation_count, 2);
    assert_eq!(r.question_mark_count, 2);
}

#[test]
fn punctuation_tokens_count_as_uppercase() {
    const ALPHABET: &[u8] = b"!?.,;:-_0123456789";
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..200 {
        let n = rng.random_range(1..8);
        let text = (0..n)
            .map(|_| {
                let len = rng.random_range(1..5);
                (0..len)
                    .map(|_| char::from(ALPHABET[rng.random_range(0..ALPHABET.len())]))
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join(" ");
        assert_eq!(count_uppercase_words(&text), n as u32, "text: {text:?}");
    }
}

#[test]
fn full_record_from_fixture_resources() {
    let fx = fixture_assembler();
    let r = fx.extract("I looooove this day!!! 😊");
    assert_eq!(r.clean_text, "love thi day");
    assert_eq!(r.pos_emoji_count, 1);
    assert_eq!(r.neg_emoji_count, 0);
    assert_eq!(r.exclamation_count, 3);
    assert_eq!(r.uppercase_word_count, 2);

    let love = fx.embeddings().vector_of("love").unwrap().to_vec();
    let expected = [love[0] / 2.0, love[1] / 2.0, (love[2] + 1.0) / 2.0];
    for (got, want) in r.embedding.iter().zip(expected) {
        assert!((got - want).abs() < 1e-6);
    }
}

#[test]
fn average_similarity_with_fixture() {
    let fx = fixture_assembler();
    assert_eq!(fx.average_similarity("nothing known", "love"), None);
    let s = fx.average_similarity("love hate", "love").unwrap();
    assert!((s - 0.5).abs() < 1e-6);
}

#[test]
fn records_serialize_with_named_fields() {
    let fx = fixture_assembler();
    let v = serde_json::to_value(fx.extract("love :(")).unwrap();
    for key in [
        "pos_emoji_count",
        "neg_emoji_count",
        "uppercase_word_count",
        "exclamation_count",
        "question_mark_count",
        "clean_text",
        "embedding",
    ] {
        assert!(v.get(key).is_some(), "missing {key}");
    }
    assert_eq!(v["neg_emoji_count"], 1);
}
