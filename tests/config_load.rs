// tests/config_load.rs
use std::path::Path;

use tweet_feature_extractor::{FeatureConfig, Resources};

#[test]
fn repo_config_loads_and_builds_an_assembler() {
    let cfg = FeatureConfig::load_from(Path::new("config/features.toml")).expect("config");
    assert_eq!(cfg.dimension, 200);
    assert_eq!(cfg.negation_window, 4);

    let fx = Resources::load(&cfg).expect("resources").into_assembler();
    let r = fx.extract("great day :) :)");
    assert_eq!(r.pos_emoji_count, 2);
    assert_eq!(r.embedding.len(), 200);
    assert!(r.embedding.iter().all(|&x| x == 0.0));
    // emoji tokens are stopwords too
    assert!(fx.stopwords().contains(":)"));
}

#[test]
fn repo_config_keeps_real_doubled_letters() {
    let cfg = FeatureConfig::load_from(Path::new("config/features.toml")).expect("config");
    let res = Resources::load(&cfg).expect("resources");
    assert!(res.vocabulary.as_ref().is_some_and(|w| w.len() > 1000));

    let fx = res.into_assembler();
    assert_eq!(fx.clean_text("good coffee all week"), "good coffe week");
    assert_eq!(fx.clean_text("I will see you too"), "");
    assert_eq!(fx.clean_text("sooo goooood <b>coffee</b>"), "good coffe");
}
