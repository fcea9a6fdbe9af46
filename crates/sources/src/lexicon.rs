//! Keyword-lexicon sentiment scorer.
//!
//! Deterministic fallback scorer that needs no network or model: counts
//! bullish and bearish keyword hits (English and Hinglish market slang)
//! and labels by the dominant side. Used in test mode and whenever the
//! remote model endpoint is not configured.

use anyhow::Result;
use async_trait::async_trait;
use crowd_pulse_core::{ScoreOutcome, SentimentLabel, SentimentScorer};

const POSITIVE_KEYWORDS: &[&str] = &[
    "rocket", "buy", "bullish", "strong", "bright", "gem", "moon",
    "breakout", "multibagger", "opportunity", "amazing", "king",
    "accumulate", "gold mine", "party", "zabardast", "mast",
];

const NEGATIVE_KEYWORDS: &[&str] = &[
    "trap", "crash", "sell", "scam", "loss", "dead", "avoid",
    "doobega", "barbaad", "risky", "danger", "overvalued",
    "bubble", "dump", "exit", "stop loss", "red",
];

/// Probability assigned when the sides tie or nothing matches.
const NEUTRAL_PROBABILITY: f64 = 0.5;
/// Probability for a one-hit margin; each further hit adds a step.
const BASE_PROBABILITY: f64 = 0.6;
const PROBABILITY_STEP: f64 = 0.08;
const MAX_PROBABILITY: f64 = 0.95;

pub struct LexiconScorer {
    model_id: String,
}

impl Default for LexiconScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl LexiconScorer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            model_id: "lexicon-v1".to_string(),
        }
    }

    /// Scores one text. Total function: degenerate input is neutral.
    #[must_use]
    pub fn score_text(&self, text: &str) -> ScoreOutcome {
        let lowered = text.to_lowercase();
        let positive_hits = POSITIVE_KEYWORDS
            .iter()
            .filter(|kw| lowered.contains(*kw))
            .count();
        let negative_hits = NEGATIVE_KEYWORDS
            .iter()
            .filter(|kw| lowered.contains(*kw))
            .count();

        if positive_hits == negative_hits {
            return ScoreOutcome {
                label: SentimentLabel::Neutral,
                probability: NEUTRAL_PROBABILITY,
            };
        }

        let (label, margin) = if positive_hits > negative_hits {
            (SentimentLabel::Positive, positive_hits - negative_hits)
        } else {
            (SentimentLabel::Negative, negative_hits - positive_hits)
        };
        let probability =
            (BASE_PROBABILITY + PROBABILITY_STEP * (margin - 1) as f64).min(MAX_PROBABILITY);

        ScoreOutcome { label, probability }
    }
}

#[async_trait]
impl SentimentScorer for LexiconScorer {
    async fn score_batch(&self, texts: &[String]) -> Result<Vec<ScoreOutcome>> {
        Ok(texts.iter().map(|t| self.score_text(t)).collect())
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bullish_text_scores_positive() {
        let scorer = LexiconScorer::new();
        let outcome = scorer.score_text("RELIANCE breakout, accumulate for multibagger returns");
        assert_eq!(outcome.label, SentimentLabel::Positive);
        assert!(outcome.probability > 0.6);
    }

    #[test]
    fn bearish_text_scores_negative() {
        let scorer = LexiconScorer::new();
        let outcome = scorer.score_text("yeh stock doobega, exit now before the crash");
        assert_eq!(outcome.label, SentimentLabel::Negative);
        assert!(outcome.probability > 0.6);
    }

    #[test]
    fn neutral_when_no_keywords() {
        let scorer = LexiconScorer::new();
        let outcome = scorer.score_text("TCS declares quarterly results on Friday");
        assert_eq!(outcome.label, SentimentLabel::Neutral);
        assert!((outcome.probability - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn tie_is_neutral() {
        let scorer = LexiconScorer::new();
        let outcome = scorer.score_text("could be a breakout or a trap");
        assert_eq!(outcome.label, SentimentLabel::Neutral);
    }

    #[test]
    fn probability_grows_with_margin_and_caps() {
        let scorer = LexiconScorer::new();
        let one = scorer.score_text("buy");
        let many = scorer.score_text("buy bullish strong breakout accumulate gem moon");
        assert!(many.probability > one.probability);
        assert!(many.probability <= 0.95);
    }

    #[test]
    fn empty_text_is_neutral() {
        let scorer = LexiconScorer::new();
        let outcome = scorer.score_text("");
        assert_eq!(outcome.label, SentimentLabel::Neutral);
    }

    #[tokio::test]
    async fn batch_preserves_order_and_length() {
        let scorer = LexiconScorer::new();
        let texts = vec![
            "buy the gem".to_string(),
            "total scam, avoid".to_string(),
            "results on friday".to_string(),
        ];
        let outcomes = scorer.score_batch(&texts).await.unwrap();
        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[0].label, SentimentLabel::Positive);
        assert_eq!(outcomes[1].label, SentimentLabel::Negative);
        assert_eq!(outcomes[2].label, SentimentLabel::Neutral);
        assert_eq!(scorer.model_id(), "lexicon-v1");
    }
}
