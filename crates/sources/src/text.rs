//! Text normalisation and symbol attribution.
//!
//! Social posts arrive as raw scraped text: URLs, handles, emoji, mixed
//! Hinglish. Scoring works on the cleaned form; symbol attribution maps
//! company aliases to tickers and falls back to the index symbol for
//! general market chatter.

use crowd_pulse_core::symbols::INDEX_SYMBOL;
use regex::Regex;
use std::sync::OnceLock;

/// Company name / alias → ticker, covering full names, abbreviations,
/// common slang and hashtag spellings. Multi-word aliases first so they
/// match before their substrings.
const SYMBOL_ALIASES: &[(&str, &str)] = &[
    ("tata consultancy", "TCS"),
    ("hindustan unilever", "HINDUNILVR"),
    ("bharti airtel", "BHARTIARTL"),
    ("kotak mahindra", "KOTAKBANK"),
    ("kotak bank", "KOTAKBANK"),
    ("larsen toubro", "LT"),
    ("axis bank", "AXISBANK"),
    ("asian paints", "ASIANPAINT"),
    ("asian paint", "ASIANPAINT"),
    ("maruti suzuki", "MARUTI"),
    ("hcl tech", "HCLTECH"),
    ("sun pharma", "SUNPHARMA"),
    ("tata motors", "TATAMOTORS"),
    ("bajaj finance", "BAJFINANCE"),
    ("ultratech cement", "ULTRACEMCO"),
    ("nestle india", "NESTLEIND"),
    ("power grid", "POWERGRID"),
    ("tech mahindra", "TECHM"),
    ("tata steel", "TATASTEEL"),
    ("mahindra mahindra", "M&M"),
    ("bajaj finserv", "BAJAJFINSV"),
    ("indusind bank", "INDUSINDBK"),
    ("jsw steel", "JSWSTEEL"),
    ("adani enterprises", "ADANIENT"),
    ("adani ports", "ADANIPORTS"),
    ("coal india", "COALINDIA"),
    ("bharat petroleum", "BPCL"),
    ("dr reddys", "DRREDDY"),
    ("dr reddy", "DRREDDY"),
    ("royal enfield", "EICHERMOT"),
    ("eicher motors", "EICHERMOT"),
    ("divis lab", "DIVISLAB"),
    ("sbi life", "SBILIFE"),
    ("hero motocorp", "HEROMOTOCO"),
    ("apollo hospitals", "APOLLOHOSP"),
    ("apollo hospital", "APOLLOHOSP"),
    ("tata consumer", "TATACONSUM"),
    ("bajaj auto", "BAJAJ-AUTO"),
    ("hdfc life", "HDFCLIFE"),
    ("hdfc bank", "HDFCBANK"),
    ("icici bank", "ICICIBANK"),
    ("state bank", "SBIN"),
    ("lt mindtree", "LTIM"),
    ("shriram finance", "SHRIRAMFIN"),
    ("reliance", "RELIANCE"),
    ("ril", "RELIANCE"),
    ("jio", "RELIANCE"),
    ("ambani", "RELIANCE"),
    ("tcs", "TCS"),
    ("hdfcbank", "HDFCBANK"),
    ("hdfc", "HDFCBANK"),
    ("infosys", "INFY"),
    ("infy", "INFY"),
    ("icici", "ICICIBANK"),
    ("hul", "HINDUNILVR"),
    ("hindunilvr", "HINDUNILVR"),
    ("itc", "ITC"),
    ("sbin", "SBIN"),
    ("sbi", "SBIN"),
    ("airtel", "BHARTIARTL"),
    ("bhartiartl", "BHARTIARTL"),
    ("kotak", "KOTAKBANK"),
    ("larsen", "LT"),
    ("l&t", "LT"),
    ("axis", "AXISBANK"),
    ("asianpaint", "ASIANPAINT"),
    ("maruti", "MARUTI"),
    ("hcltech", "HCLTECH"),
    ("hcl", "HCLTECH"),
    ("sunpharma", "SUNPHARMA"),
    ("tatamotors", "TATAMOTORS"),
    ("bajfinance", "BAJFINANCE"),
    ("wipro", "WIPRO"),
    ("titan", "TITAN"),
    ("ultratech", "ULTRACEMCO"),
    ("nestle", "NESTLEIND"),
    ("powergrid", "POWERGRID"),
    ("ntpc", "NTPC"),
    ("techm", "TECHM"),
    ("tatasteel", "TATASTEEL"),
    ("m&m", "M&M"),
    ("mahindra", "M&M"),
    ("bajajfinsv", "BAJAJFINSV"),
    ("indusind", "INDUSINDBK"),
    ("ongc", "ONGC"),
    ("jsw", "JSWSTEEL"),
    ("adanient", "ADANIENT"),
    ("adaniports", "ADANIPORTS"),
    ("adani", "ADANIENT"),
    ("coalindia", "COALINDIA"),
    ("grasim", "GRASIM"),
    ("cipla", "CIPLA"),
    ("bpcl", "BPCL"),
    ("drreddy", "DRREDDY"),
    ("eicher", "EICHERMOT"),
    ("divislab", "DIVISLAB"),
    ("sbilife", "SBILIFE"),
    ("britannia", "BRITANNIA"),
    ("heromotoco", "HEROMOTOCO"),
    ("hero", "HEROMOTOCO"),
    ("apollo", "APOLLOHOSP"),
    ("tataconsum", "TATACONSUM"),
    ("hindalco", "HINDALCO"),
    ("bajaj-auto", "BAJAJ-AUTO"),
    ("hdfclife", "HDFCLIFE"),
    ("ltimindtree", "LTIM"),
    ("mindtree", "LTIM"),
    ("ltim", "LTIM"),
    ("shriram", "SHRIRAMFIN"),
];

fn url_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"https?://\S+|www\.\S+").expect("valid regex"))
}

fn handle_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"@\w+").expect("valid regex"))
}

fn noise_re() -> &'static Regex {
    // Keep letters, digits, basic punctuation; drops emoji and control chars
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\w\s.,!?%&'#-]").expect("valid regex"))
}

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("valid regex"))
}

/// Cleans and normalises raw social media text for scoring.
#[must_use]
pub fn clean_text(text: &str) -> String {
    let text = url_re().replace_all(text, " ");
    let text = handle_re().replace_all(&text, " ");
    let text = noise_re().replace_all(&text, " ");
    let text = whitespace_re().replace_all(&text, " ");
    text.trim().to_string()
}

/// Maps a post's text to the ticker it talks about.
///
/// Alias matching is case-insensitive and ordered, multi-word aliases
/// first. Posts with no specific mention are attributed to the index
/// symbol — general market sentiment.
#[must_use]
pub fn extract_symbol(text: &str) -> String {
    let lowered = text.to_lowercase();
    for (alias, symbol) in SYMBOL_ALIASES {
        if contains_word(&lowered, alias) {
            return (*symbol).to_string();
        }
    }
    INDEX_SYMBOL.to_string()
}

/// Word-boundary containment: "itc" must not match inside "pitch".
fn contains_word(haystack: &str, needle: &str) -> bool {
    let mut start = 0;
    while let Some(pos) = haystack[start..].find(needle) {
        let at = start + pos;
        let end = at + needle.len();
        let before_ok = at == 0
            || !haystack[..at]
                .chars()
                .next_back()
                .is_some_and(char::is_alphanumeric);
        let after_ok = end == haystack.len()
            || !haystack[end..].chars().next().is_some_and(char::is_alphanumeric);
        if before_ok && after_ok {
            return true;
        }
        start = at + 1;
    }
    false
}
