//! Candidate token assembly.

use std::fmt;

use crate::finding::AnomalyFinding;

/// The ordered concatenation of every finding's character.
///
/// An empty token means nothing was found. It is never sent for verification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CandidateToken {
    value: String,
}

impl CandidateToken {
    /// Concatenate the characters of ordered findings, without normalization.
    #[must_use]
    pub fn assemble(findings: &[AnomalyFinding]) -> Self {
        Self {
            value: findings.iter().map(AnomalyFinding::character).collect(),
        }
    }

    /// Whether any finding contributed to the token.
    #[must_use]
    pub fn is_formed(&self) -> bool {
        !self.value.is_empty()
    }

    /// The token text, or `None` when nothing was found.
    #[must_use]
    pub fn formed(&self) -> Option<&str> {
        if self.is_formed() {
            Some(&self.value)
        } else {
            None
        }
    }

    /// The raw token text, possibly empty.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Number of characters in the token.
    #[must_use]
    pub fn char_count(&self) -> usize {
        self.value.chars().count()
    }
}

impl fmt::Display for CandidateToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}
