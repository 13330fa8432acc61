//! Direction of immunogenicity modulation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::VlpimError;

/// `Reduce` neutralises the most immunogenic regions; `Enhance` strengthens
/// binding in currently weak regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ImmunogenicityMode {
    #[default]
    Reduce,
    Enhance,
}

impl ImmunogenicityMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reduce => "reduce",
            Self::Enhance => "enhance",
        }
    }

    /// Whether epitope residues are held fixed during sequence generation.
    pub fn fixes_epitope_positions(&self) -> bool {
        matches!(self, Self::Reduce)
    }
}

impl fmt::Display for ImmunogenicityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImmunogenicityMode {
    type Err = VlpimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reduce" => Ok(Self::Reduce),
            "enhance" => Ok(Self::Enhance),
            other => Err(VlpimError::Config(format!(
                "unknown mode '{other}', expected 'reduce' or 'enhance'"
            ))),
        }
    }
}
