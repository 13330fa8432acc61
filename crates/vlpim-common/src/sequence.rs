//! Parent protein sequence with 1-based window access.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, VlpimError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProteinSequence(String);

impl ProteinSequence {
    /// Whitespace is stripped and residues upper-cased. Anything other than
    /// letters (plus `*` and `-`) is rejected.
    pub fn new(raw: &str) -> Result<Self> {
        let cleaned: String = raw
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| c.to_ascii_uppercase())
            .collect();
        if cleaned.is_empty() {
            return Err(VlpimError::InvalidSequence("sequence is empty".to_string()));
        }
        if let Some(bad) = cleaned
            .chars()
            .find(|c| !(c.is_ascii_alphabetic() || *c == '*' || *c == '-'))
        {
            return Err(VlpimError::InvalidSequence(format!(
                "unexpected character '{bad}'"
            )));
        }
        Ok(Self(cleaned))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Residues `start..=end` (1-based, inclusive). `None` if the window is
    /// empty or leaves the sequence.
    pub fn window(&self, start: usize, end: usize) -> Option<&str> {
        if start == 0 || end < start || end > self.len() {
            return None;
        }
        self.0.get(start - 1..end)
    }

    /// Find `needle` inside the 1-based window `start..=end`, returning the
    /// 1-based position of its first residue in the parent.
    pub fn locate_within(&self, needle: &str, start: usize, end: usize) -> Option<usize> {
        let window = self.window(start, end)?;
        window.find(needle).map(|offset| start + offset)
    }
}

impl fmt::Display for ProteinSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ProteinSequence {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
