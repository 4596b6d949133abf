// src/normalize.rs
//! Regex canonicalization applied to raw tweet text before tokenization.
//!
//! Order matters and is fixed:
//! 1) lower-case
//! 2) HTML entity decode (`&amp;` → `&`), then markup tags dropped (`<b>hi</b>` → `hi`)
//! 3) contraction expansion (must run before anything that strips apostrophes)
//! 4) URLs, 5) @mentions, 6) `#` of hashtags (the tag word stays)
//! 7) everything that is not an ASCII letter → single space
//! 8) month names / date-like fragments
//!
//! Every rule is applied to the whole string; later rules see the output of earlier ones.
//! Unmatched patterns are no-ops, so `normalize` never fails.

use once_cell::sync::Lazy;
use regex::Regex;

/// Contraction rules, in application order. `$1` keeps the word stem in front of the suffix.
const CONTRACTION_RULES: &[(&str, &str)] = &[
    (r"won't", "will not"),
    (r"can't", "cannot"),
    (r"i'm", "i am"),
    (r"ain't", "is not"),
    (r"(\w+)'ll", "${1} will"),
    (r"(\w+)n't", "${1} not"),
    (r"(\w+)'ve", "${1} have"),
    (r"(\w+)'s", "${1} is"),
    (r"(\w+)'re", "${1} are"),
    (r"(\w+)'d", "${1} would"),
];

/// Stripping rules applied after contractions.
const STRIP_RULES: &[(&str, &str)] = &[
    // urls
    (r"((www\.[^\s]+)|(https?://[^\s]+))", ""),
    // usernames
    (r"@[^\s]+", ""),
    // keep the hashtag word, drop '#'
    (r"#([^\s]+)", "${1}"),
    // letters only
    (r"[^a-zA-Z]+", " "),
    // months and date-like tails (no trailing word boundary: "mayor" loses "mayo")
    (
        concat!(
            r"(\b\d{1,2}\D{0,3})?\b(?:jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|jun(?:e)?|jul(?:y)?|",
            r"aug(?:ust)?|sep(?:tember)?|oct(?:ober)?|(nov|dec)(?:ember)?)\D?(\d{1,2}(st|nd|rd|th)?)?(([,.\-/])",
            r"\D?)?((19[7-9]\d|20\d{2})|\d{2})*"
        ),
        "",
    ),
];

static HTML_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)</?[^>]+>").expect("tag regex"));

static DEFAULT_RULES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    CONTRACTION_RULES
        .iter()
        .chain(STRIP_RULES.iter())
        .map(|(pat, repl)| (Regex::new(pat).expect("normalizer regex"), *repl))
        .collect()
});

/// Ordered list of regex substitutions.
#[derive(Debug, Clone)]
pub struct RegexNormalizer {
    rules: Vec<(Regex, String)>,
}

impl Default for RegexNormalizer {
    fn default() -> Self {
        Self {
            rules: DEFAULT_RULES
                .iter()
                .map(|(re, repl)| (re.clone(), (*repl).to_string()))
                .collect(),
        }
    }
}

impl RegexNormalizer {
    /// Build from custom `(pattern, replacement)` pairs. Replacement uses `${n}` group syntax.
    pub fn with_rules<P, R>(rules: &[(P, R)]) -> anyhow::Result<Self>
    where
        P: AsRef<str>,
        R: AsRef<str>,
    {
        let rules = rules
            .iter()
            .map(|(p, r)| {
                let re = Regex::new(p.as_ref())
                    .map_err(|e| anyhow::anyhow!("normalizer rule `{}`: {}", p.as_ref(), e))?;
                Ok((re, r.as_ref().to_string()))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    /// Lower-case, reduce HTML to its text, then apply every rule in order.
    pub fn normalize(&self, text: &str) -> String {
        let lowered = text.to_lowercase();
        self.apply_rules(&html_to_text(&lowered))
    }

    /// Apply the substitution list only (no lower-casing, no HTML handling).
    pub fn apply_rules(&self, text: &str) -> String {
        let mut s = text.to_string();
        for (re, repl) in &self.rules {
            s = re.replace_all(&s, repl.as_str()).into_owned();
        }
        s
    }

    /// Number of substitution rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Entity decoding followed by tag removal; tags vanish without leaving a space.
pub fn html_to_text(text: &str) -> String {
    let decoded = html_escape::decode_html_entities(text);
    HTML_TAGS.replace_all(&decoded, "").into_owned()
}

/// Split normalized text into tokens. After letters-only stripping, whitespace is the only separator.
pub fn tokenize(normalized: &str) -> Vec<String> {
    normalized.split_whitespace().map(str::to_string).collect()
}

/// Contraction expansion only. Useful to inspect text before letters-only stripping.
pub fn expand_contractions(text: &str) -> String {
    let contractions = RegexNormalizer {
        rules: DEFAULT_RULES
            .iter()
            .take(CONTRACTION_RULES.len())
            .map(|(re, repl)| (re.clone(), (*repl).to_string()))
            .collect(),
    };
    contractions.apply_rules(&text.to_lowercase())
}
