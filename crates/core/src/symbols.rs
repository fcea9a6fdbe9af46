//! Tracked symbol universe.

/// Symbol posts fall back to when no specific stock is mentioned:
/// general market sentiment.
pub const INDEX_SYMBOL: &str = "NIFTY";

/// Nifty 50 constituents (NSE tickers).
pub const NIFTY_50_SYMBOLS: [&str; 50] = [
    "RELIANCE", "TCS", "HDFCBANK", "INFY", "ICICIBANK",
    "HINDUNILVR", "ITC", "SBIN", "BHARTIARTL", "KOTAKBANK",
    "LT", "AXISBANK", "ASIANPAINT", "MARUTI", "HCLTECH",
    "SUNPHARMA", "TATAMOTORS", "BAJFINANCE", "WIPRO", "TITAN",
    "ULTRACEMCO", "NESTLEIND", "POWERGRID", "NTPC", "TECHM",
    "TATASTEEL", "M&M", "BAJAJFINSV", "INDUSINDBK", "ONGC",
    "JSWSTEEL", "ADANIENT", "ADANIPORTS", "COALINDIA", "GRASIM",
    "CIPLA", "BPCL", "DRREDDY", "EICHERMOT", "DIVISLAB",
    "SBILIFE", "BRITANNIA", "HEROMOTOCO", "APOLLOHOSP", "TATACONSUM",
    "HINDALCO", "BAJAJ-AUTO", "HDFCLIFE", "LTIM", "SHRIRAMFIN",
];

/// Returns the default tracked universe as owned strings.
#[must_use]
pub fn default_symbols() -> Vec<String> {
    NIFTY_50_SYMBOLS.iter().map(|s| (*s).to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn universe_has_fifty_unique_symbols() {
        let unique: std::collections::HashSet<_> = NIFTY_50_SYMBOLS.iter().collect();
        assert_eq!(unique.len(), 50);
    }

    #[test]
    fn index_symbol_not_in_universe() {
        assert!(!NIFTY_50_SYMBOLS.contains(&INDEX_SYMBOL));
    }
}
