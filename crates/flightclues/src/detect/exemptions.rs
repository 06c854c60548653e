//! Literal leading-anomaly table.
//!
//! The camel-case rule cannot see an anomaly in the first position, since
//! nothing precedes it. Known cases are listed here as literal country names
//! mapped to the character they hide. There is no general "first letter is
//! wrong" heuristic; new cases are added as literals.

use std::collections::BTreeMap;

/// Known misspelled country names and the leading character each one hides.
#[must_use]
pub fn default_leading_anomalies() -> BTreeMap<String, char> {
    BTreeMap::from([("Quatemala".to_string(), 'Q')])
}

/// Lookup table of literal country names with a hidden leading character.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeadingAnomalyTable {
    entries: BTreeMap<String, char>,
}

impl LeadingAnomalyTable {
    /// The built-in table.
    #[must_use]
    pub fn builtin() -> Self {
        Self::from_entries(default_leading_anomalies())
    }

    /// Build a table from literal/character pairs.
    #[must_use]
    pub fn from_entries(entries: impl IntoIterator<Item = (String, char)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// The hidden character for an exact literal match.
    #[must_use]
    pub fn lookup(&self, text: &str) -> Option<char> {
        self.entries.get(text).copied()
    }

    /// Add or replace a literal.
    pub fn insert(&mut self, literal: impl Into<String>, character: char) {
        self.entries.insert(literal.into(), character);
    }

    /// Number of literals in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
