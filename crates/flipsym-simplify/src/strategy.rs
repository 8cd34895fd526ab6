//! Simplification strategies.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Errors from configuring the simplifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimplifyError {
    /// A strategy name that is neither `direct` nor `trig-first`.
    #[error("unknown simplification strategy `{0}`, choose between `direct` and `trig-first`")]
    UnknownStrategy(String),
    /// An expression string that does not parse.
    #[error("parse error: {0}")]
    Parse(#[from] flipsym_core::ParseError),
}

/// How the first rewrite of the fixed-point loop is chosen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    /// General simplification first, then TR8 and factoring until stable.
    #[default]
    #[serde(rename = "direct", alias = "simplify_iteration")]
    Direct,
    /// TR8 and factoring from the start.
    #[serde(rename = "trig-first", alias = "tr8_iteration")]
    TrigFirst,
}

impl Strategy {
    /// Both strategies.
    pub const ALL: [Strategy; 2] = [Strategy::Direct, Strategy::TrigFirst];

    /// Canonical name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Strategy::Direct => "direct",
            Strategy::TrigFirst => "trig-first",
        }
    }

    /// Name used by the legacy generator.
    #[must_use]
    pub const fn legacy_name(self) -> &'static str {
        match self {
            Strategy::Direct => "simplify_iteration",
            Strategy::TrigFirst => "tr8_iteration",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = SimplifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Self::ALL
            .into_iter()
            .find(|st| st.name() == name || st.legacy_name() == name)
            .ok_or_else(|| {
                warn!(strategy = name, "rejected simplification strategy");
                SimplifyError::UnknownStrategy(name.to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names() {
        assert_eq!("direct".parse::<Strategy>().unwrap(), Strategy::Direct);
        assert_eq!("trig-first".parse::<Strategy>().unwrap(), Strategy::TrigFirst);
        assert_eq!("simplify_iteration".parse::<Strategy>().unwrap(), Strategy::Direct);
        assert_eq!("tr8_iteration".parse::<Strategy>().unwrap(), Strategy::TrigFirst);
    }

    #[test]
    fn test_unknown_name_lists_both() {
        let err = "ratsimp".parse::<Strategy>().unwrap_err();
        assert_eq!(err, SimplifyError::UnknownStrategy("ratsimp".to_string()));
        let message = err.to_string();
        assert!(message.contains("direct"));
        assert!(message.contains("trig-first"));
    }

    #[test]
    fn test_serde_accepts_legacy_names() {
        let s: Strategy = serde_json::from_str("\"tr8_iteration\"").unwrap();
        assert_eq!(s, Strategy::TrigFirst);
        assert_eq!(serde_json::to_string(&Strategy::TrigFirst).unwrap(), "\"trig-first\"");
    }
}
