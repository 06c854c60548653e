//! Built-in character patterns used by the field detectors.
//!
//! Each pattern flags individual characters. When a pattern has a capture
//! group, the group is the flagged part and the rest of the match is only
//! context (this is how the camel-case rule expresses "preceded by a
//! lowercase letter" without lookbehind).

use regex::Regex;

/// A compiled anomaly pattern.
#[derive(Debug)]
pub struct AnomalyPattern {
    regex: Regex,
}

impl AnomalyPattern {
    /// Create a new anomaly pattern.
    ///
    /// # Panics
    ///
    /// Panics if the regex pattern is invalid.
    #[must_use]
    pub fn new(pattern: &str) -> Self {
        Self {
            regex: Regex::new(pattern).expect("Invalid regex pattern"),
        }
    }

    /// Every flagged character, in left-to-right order.
    #[must_use]
    pub fn flagged_chars(&self, text: &str) -> Vec<char> {
        self.regex
            .captures_iter(text)
            .filter_map(|caps| caps.get(1).or_else(|| caps.get(0)))
            .flat_map(|m| m.as_str().chars())
            .collect()
    }
}

/// The fixed set of patterns every detector draws from.
#[derive(Debug)]
pub struct PatternSet {
    /// Anything that is not an uppercase Latin letter.
    pub non_uppercase: AnomalyPattern,
    /// Any ASCII letter.
    pub letter: AnomalyPattern,
    /// Any decimal digit.
    pub digit: AnomalyPattern,
    /// An uppercase letter directly after a lowercase one.
    pub camel_case: AnomalyPattern,
}

impl PatternSet {
    /// Compile the built-in patterns.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            non_uppercase: AnomalyPattern::new(r"[^A-Z]"),
            letter: AnomalyPattern::new(r"[a-zA-Z]"),
            digit: AnomalyPattern::new(r"\d"),
            camel_case: AnomalyPattern::new(r"[a-z]([A-Z])"),
        }
    }
}

impl Default for PatternSet {
    fn default() -> Self {
        Self::builtin()
    }
}
