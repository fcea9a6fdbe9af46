//! External service identifiers used for quota accounting.

use serde::{Deserialize, Serialize};

/// An external service the pipeline spends daily call budget on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Service {
    Telegram,
    Youtube,
    Twitter,
    /// Daily OHLCV + delivery volume provider.
    Market,
    /// Remote sentiment model endpoint.
    Scoring,
}

impl Service {
    /// Returns the string representation used in logs and audit rows.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Service::Telegram => "telegram",
            Service::Youtube => "youtube",
            Service::Twitter => "twitter",
            Service::Market => "market",
            Service::Scoring => "scoring",
        }
    }

    /// All services, in pipeline step order.
    #[must_use]
    pub const fn all() -> [Service; 5] {
        [
            Service::Telegram,
            Service::Youtube,
            Service::Twitter,
            Service::Market,
            Service::Scoring,
        ]
    }

    /// The discussion sources, in pipeline step order.
    #[must_use]
    pub const fn discussion_sources() -> [Service; 3] {
        [Service::Telegram, Service::Youtube, Service::Twitter]
    }

    /// Parses from string (non-failing version).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "telegram" => Some(Self::Telegram),
            "youtube" => Some(Self::Youtube),
            "twitter" => Some(Self::Twitter),
            "market" => Some(Self::Market),
            "scoring" => Some(Self::Scoring),
            _ => None,
        }
    }
}

impl std::fmt::Display for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_as_str_roundtrips() {
        for service in Service::all() {
            assert_eq!(Service::parse(service.as_str()), Some(service));
        }
    }

    #[test]
    fn discussion_sources_precede_market() {
        let all = Service::all();
        assert_eq!(&all[..3], &Service::discussion_sources());
        assert_eq!(all[3], Service::Market);
        assert_eq!(all[4], Service::Scoring);
    }

    #[test]
    fn service_parse_unknown_is_none() {
        assert_eq!(Service::parse("reddit"), None);
    }
}
