// src/negation.rs
//! Negation scope marking with parity counting.
//!
//! For every cue keyword, only its first occurrence opens a scope covering the cue
//! itself plus the next `window` tokens. Scopes add up per position; odd counts get
//! the `NEG_` prefix, so two overlapping scopes cancel out.

pub const NEG_PREFIX: &str = "NEG_";
pub const DEFAULT_NEGATION_WINDOW: usize = 4;

/// Cue keywords. Apostrophe forms are kept for callers feeding unnormalized tokens.
pub const NEGATION_CUES: &[&str] = &[
    "isn't", "aren't", "wasn't", "weren't", "ain't", "haven't", "hasn't", "hadn't", "won't",
    "wouldn't", "don't", "doesn't", "didn't", "can't", "couldn't", "shouldn't", "mightn't",
    "mustn't", "never", "nothing", "nowhere", "noone", "none", "not",
];

#[derive(Debug, Clone)]
pub struct NegationScopeMarker {
    window: usize,
}

impl Default for NegationScopeMarker {
    fn default() -> Self {
        Self::new(DEFAULT_NEGATION_WINDOW)
    }
}

impl NegationScopeMarker {
    pub fn new(window: usize) -> Self {
        Self { window }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Per-position scope counts, same length as `tokens`.
    pub fn scope_counts(&self, tokens: &[String]) -> Vec<u32> {
        let mut counts = vec![0u32; tokens.len()];
        if tokens.is_empty() {
            return counts;
        }
        for cue in NEGATION_CUES {
            let Some(start) = tokens.iter().position(|t| t == cue) else {
                continue;
            };
            let end = start.saturating_add(self.window).min(tokens.len() - 1);
            for c in &mut counts[start..=end] {
                *c += 1;
            }
        }
        counts
    }

    /// Same length and order as the input; only odd-count positions are prefixed.
    pub fn mark(&self, tokens: Vec<String>) -> Vec<String> {
        let counts = self.scope_counts(&tokens);
        tokens
            .into_iter()
            .zip(counts)
            .map(|(tok, n)| {
                if n % 2 == 1 {
                    format!("{NEG_PREFIX}{tok}")
                } else {
                    tok
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(s: &str) -> Vec<String> {
        s.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn window_includes_cue_and_clips() {
        let m = NegationScopeMarker::default();
        let out = m.mark(toks("i do not like it"));
        assert_eq!(out, toks("i do NEG_not NEG_like NEG_it"));
    }

    #[test]
    fn window_stops_after_four_tokens() {
        let m = NegationScopeMarker::default();
        let out = m.mark(toks("never a b c d e f"));
        assert_eq!(out, toks("NEG_never NEG_a NEG_b NEG_c NEG_d e f"));
    }

    #[test]
    fn overlapping_scopes_cancel() {
        let m = NegationScopeMarker::default();
        // "not" at 0 covers 0..=4, "never" at 2 covers 2..=6
        let out = m.mark(toks("not a never b c d e f"));
        assert_eq!(out, toks("NEG_not NEG_a never b c NEG_d NEG_e f"));
    }

    #[test]
    fn only_first_occurrence_of_a_cue_is_scoped() {
        let m = NegationScopeMarker::default();
        let out = m.mark(toks("not a b c d e f not g"));
        assert_eq!(out, toks("NEG_not NEG_a NEG_b NEG_c NEG_d e f not g"));
    }

    #[test]
    fn preserves_length_and_handles_empty() {
        let m = NegationScopeMarker::new(2);
        assert!(m.mark(Vec::new()).is_empty());
        let input = toks("a b c");
        let out = m.mark(input.clone());
        assert_eq!(out, input);
        assert_eq!(m.scope_counts(&toks("x none y z w")), vec![0, 1, 1, 1, 0]);
    }
}
