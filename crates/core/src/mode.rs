//! Test/live data partition flag.
//!
//! Every persisted row carries a mode so test and live data never mix in a
//! query. The mode is threaded explicitly through every read and write path
//! rather than held as ambient process state.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DataMode {
    /// No external calls; operates only on previously seeded/ingested data.
    #[default]
    Test,
    /// Exercises real source adapters under quota control.
    Live,
}

impl DataMode {
    /// Returns the string representation stored in the database.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            DataMode::Test => "test",
            DataMode::Live => "live",
        }
    }

    /// Parses from string (non-failing version).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "test" => Some(Self::Test),
            "live" => Some(Self::Live),
            _ => None,
        }
    }
}

impl std::str::FromStr for DataMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| anyhow::anyhow!("Invalid data mode: {}", s))
    }
}

impl std::fmt::Display for DataMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_as_str_roundtrips() {
        assert_eq!(DataMode::parse(DataMode::Test.as_str()), Some(DataMode::Test));
        assert_eq!(DataMode::parse(DataMode::Live.as_str()), Some(DataMode::Live));
    }

    #[test]
    fn mode_parse_is_case_insensitive() {
        assert_eq!(DataMode::parse("LIVE"), Some(DataMode::Live));
        assert_eq!(DataMode::parse("Test"), Some(DataMode::Test));
        assert_eq!(DataMode::parse("demo"), None);
    }

    #[test]
    fn mode_default_is_test() {
        assert_eq!(DataMode::default(), DataMode::Test);
    }

    #[test]
    fn mode_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&DataMode::Live).unwrap(), "\"live\"");
    }
}
