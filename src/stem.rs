// src/stem.rs
//! Classic Porter suffix stripping (Porter, 1980) in the flavour the classifier was
//! trained against:
//! - a handful of irregular forms map straight to their stem ("dying" → "die")
//! - words of two letters or fewer are left alone
//! - extra rules for short `-ies`/`-ied`, `-alli`, `-fulli` and `-logi`
//!
//! This is not Snowball English ("Porter2"): "was" stems to "wa" and "this" to
//! "thi", so those tokens survive the stopword filter downstream.
//!
//! Tokens reaching the stemmer are lower-case ASCII letters; anything else is
//! returned lower-cased and otherwise untouched.

/// Step 2 rules; the stem must have measure > 0.
const STEP2: &[(&str, &str)] = &[
    ("ational", "ate"),
    ("tional", "tion"),
    ("enci", "ence"),
    ("anci", "ance"),
    ("izer", "ize"),
    ("bli", "ble"),
    ("alli", "al"),
    ("entli", "ent"),
    ("eli", "e"),
    ("ousli", "ous"),
    ("ization", "ize"),
    ("ation", "ate"),
    ("ator", "ate"),
    ("alism", "al"),
    ("iveness", "ive"),
    ("fulness", "ful"),
    ("ousness", "ous"),
    ("aliti", "al"),
    ("iviti", "ive"),
    ("biliti", "ble"),
    ("fulli", "ful"),
];

/// Step 3 rules; the stem must have measure > 0.
const STEP3: &[(&str, &str)] = &[
    ("icate", "ic"),
    ("ative", ""),
    ("alize", "al"),
    ("iciti", "ic"),
    ("ical", "ic"),
    ("ful", ""),
    ("ness", ""),
];

/// Step 4 suffixes, dropped when the stem has measure > 1. `-ion` is handled apart.
const STEP4: &[&str] = &[
    "al", "ance", "ence", "er", "ic", "able", "ible", "ant", "ement", "ment", "ent", "ou",
    "ism", "ate", "iti", "ous", "ive", "ize",
];

#[derive(Debug, Clone, Copy, Default)]
pub struct PorterStemmer;

impl PorterStemmer {
    pub fn stem(&self, token: &str) -> String {
        let word = token.to_lowercase();
        if let Some(stem) = irregular_form(&word) {
            return stem.to_string();
        }
        if word.len() <= 2 || !word.is_ascii() {
            return word;
        }
        let word = step1a(&word);
        let word = step1b(&word);
        let word = step1c(&word);
        let word = step2(&word);
        let word = replace_first(&word, STEP3, 0);
        let word = step4(&word);
        let word = step5a(&word);
        step5b(&word)
    }

    pub fn stem_all(&self, tokens: &[String]) -> Vec<String> {
        tokens.iter().map(|t| self.stem(t)).collect()
    }
}

fn irregular_form(word: &str) -> Option<&'static str> {
    let stem = match word {
        "sky" | "skies" => "sky",
        "dying" => "die",
        "lying" => "lie",
        "tying" => "tie",
        "news" => "news",
        "innings" | "inning" => "inning",
        "outings" | "outing" => "outing",
        "cannings" | "canning" => "canning",
        "howe" => "howe",
        "proceed" => "proceed",
        "exceed" => "exceed",
        "succeed" => "succeed",
        _ => return None,
    };
    Some(stem)
}

/// `y` is a consonant at the start of a word or after a vowel.
fn is_consonant(w: &[u8], i: usize) -> bool {
    match w[i] {
        b'a' | b'e' | b'i' | b'o' | b'u' => false,
        b'y' => i == 0 || !is_consonant(w, i - 1),
        _ => true,
    }
}

/// Number of vowel→consonant transitions, the `m` in `[C](VC)^m[V]`.
fn measure(stem: &str) -> usize {
    let w = stem.as_bytes();
    let mut count = 0;
    let mut prev_vowel = false;
    for i in 0..w.len() {
        let consonant = is_consonant(w, i);
        if consonant && prev_vowel {
            count += 1;
        }
        prev_vowel = !consonant;
    }
    count
}

fn contains_vowel(stem: &str) -> bool {
    let w = stem.as_bytes();
    (0..w.len()).any(|i| !is_consonant(w, i))
}

fn ends_double_consonant(word: &str) -> bool {
    let w = word.as_bytes();
    let n = w.len();
    n >= 2 && w[n - 1] == w[n - 2] && is_consonant(w, n - 1)
}

/// consonant-vowel-consonant ending, last letter not w/x/y; a two-letter
/// vowel-consonant word also counts.
fn ends_cvc(word: &str) -> bool {
    let w = word.as_bytes();
    let n = w.len();
    (n >= 3
        && is_consonant(w, n - 3)
        && !is_consonant(w, n - 2)
        && is_consonant(w, n - 1)
        && !matches!(w[n - 1], b'w' | b'x' | b'y'))
        || (n == 2 && !is_consonant(w, 0) && is_consonant(w, 1))
}

/// The first matching suffix decides: replaced when the stem's measure exceeds
/// `min_measure`, otherwise the word is kept as is.
fn replace_first(word: &str, rules: &[(&str, &str)], min_measure: usize) -> String {
    for &(suffix, replacement) in rules {
        if let Some(stem) = word.strip_suffix(suffix) {
            if measure(stem) > min_measure {
                return format!("{stem}{replacement}");
            }
            return word.to_string();
        }
    }
    word.to_string()
}

fn step1a(word: &str) -> String {
    if word.len() == 4 {
        if let Some(stem) = word.strip_suffix("ies") {
            return format!("{stem}ie");
        }
    }
    for (suffix, replacement) in [("sses", "ss"), ("ies", "i"), ("ss", "ss"), ("s", "")] {
        if let Some(stem) = word.strip_suffix(suffix) {
            return format!("{stem}{replacement}");
        }
    }
    word.to_string()
}

fn step1b(word: &str) -> String {
    if let Some(stem) = word.strip_suffix("ied") {
        return if word.len() == 4 {
            format!("{stem}ie")
        } else {
            format!("{stem}i")
        };
    }
    if let Some(stem) = word.strip_suffix("eed") {
        return if measure(stem) > 0 {
            format!("{stem}ee")
        } else {
            word.to_string()
        };
    }
    let Some(stem) = ["ed", "ing"]
        .iter()
        .filter_map(|suffix| word.strip_suffix(suffix))
        .find(|stem| contains_vowel(stem))
    else {
        return word.to_string();
    };

    for (suffix, replacement) in [("at", "ate"), ("bl", "ble"), ("iz", "ize")] {
        if let Some(base) = stem.strip_suffix(suffix) {
            return format!("{base}{replacement}");
        }
    }
    if ends_double_consonant(stem) {
        return if stem.ends_with(['l', 's', 'z']) {
            stem.to_string()
        } else {
            stem[..stem.len() - 1].to_string()
        };
    }
    if measure(stem) == 1 && ends_cvc(stem) {
        return format!("{stem}e");
    }
    stem.to_string()
}

fn step1c(word: &str) -> String {
    match word.strip_suffix('y') {
        Some(stem) if stem.len() > 1 && is_consonant(stem.as_bytes(), stem.len() - 1) => {
            format!("{stem}i")
        }
        _ => word.to_string(),
    }
}

fn step2(word: &str) -> String {
    if let Some(stem) = word.strip_suffix("alli") {
        if measure(stem) > 0 {
            return step2(&format!("{stem}al"));
        }
    }
    // measured on the stem plus its `l`
    if let Some(stem) = word.strip_suffix("logi") {
        return if measure(&word[..word.len() - 3]) > 0 {
            format!("{stem}log")
        } else {
            word.to_string()
        };
    }
    replace_first(word, STEP2, 0)
}

fn step4(word: &str) -> String {
    if let Some(stem) = word.strip_suffix("ion") {
        return if measure(stem) > 1 && stem.ends_with(['s', 't']) {
            stem.to_string()
        } else {
            word.to_string()
        };
    }
    for suffix in STEP4 {
        if let Some(stem) = word.strip_suffix(suffix) {
            return if measure(stem) > 1 {
                stem.to_string()
            } else {
                word.to_string()
            };
        }
    }
    word.to_string()
}

fn step5a(word: &str) -> String {
    if let Some(stem) = word.strip_suffix('e') {
        let m = measure(stem);
        if m > 1 || (m == 1 && !ends_cvc(stem)) {
            return stem.to_string();
        }
    }
    word.to_string()
}

fn step5b(word: &str) -> String {
    if word.ends_with("ll") && measure(&word[..word.len() - 1]) > 1 {
        return word[..word.len() - 1].to_string();
    }
    word.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(pairs: &[(&str, &str)]) {
        let s = PorterStemmer;
        for (word, want) in pairs {
            assert_eq!(s.stem(word), *want, "stem({word:?})");
        }
    }

    #[test]
    fn strips_common_suffixes() {
        check(&[
            ("running", "run"),
            ("cats", "cat"),
            ("loving", "love"),
            ("hopping", "hop"),
            ("caresses", "caress"),
            ("ponies", "poni"),
            ("agreed", "agre"),
            ("relational", "relat"),
            ("happiness", "happi"),
            ("happy", "happi"),
        ]);
    }

    #[test]
    fn classic_porter_not_snowball() {
        check(&[
            ("was", "wa"),
            ("this", "thi"),
            ("has", "ha"),
            ("fairly", "fairli"),
            ("generously", "gener"),
        ]);
    }

    #[test]
    fn short_and_irregular_words() {
        check(&[
            ("is", "is"),
            ("ties", "tie"),
            ("dying", "die"),
            ("skies", "sky"),
            ("news", "news"),
            ("feed", "feed"),
            ("coffee", "coffe"),
        ]);
    }

    #[test]
    fn deterministic_for_non_words() {
        let s = PorterStemmer;
        assert_eq!(s.stem("zzzqing"), s.stem("zzzqing"));
        assert_eq!(s.stem(""), "");
        assert_eq!(s.stem("ÿÿing"), "ÿÿing");
    }
}
