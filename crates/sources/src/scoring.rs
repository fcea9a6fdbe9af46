//! Remote sentiment-model client.
//!
//! Posts batches of cleaned texts to a scoring endpoint and maps the
//! responses back to labels. A record whose response is malformed scores
//! neutral instead of failing the batch.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use crowd_pulse_core::{ScoreOutcome, SentimentLabel, SentimentScorer};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub struct HttpScorerConfig {
    /// Scoring endpoint accepting `{"texts": [...]}`.
    pub url: String,
    pub api_key: Option<String>,
    /// Identifier recorded with every scored row.
    pub model_id: String,
}

impl HttpScorerConfig {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: None,
            model_id: "remote-v1".to_string(),
        }
    }

    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    #[must_use]
    pub fn with_model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }
}

pub struct HttpScorer {
    config: HttpScorerConfig,
    http: reqwest::Client,
}

impl HttpScorer {
    #[must_use]
    pub fn new(config: HttpScorerConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl SentimentScorer for HttpScorer {
    async fn score_batch(&self, texts: &[String]) -> Result<Vec<ScoreOutcome>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut request = self
            .http
            .post(&self.config.url)
            .json(&ScoreRequest { texts });
        if let Some(ref key) = self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow!("scoring endpoint error {}: {}", status, text));
        }

        let payload: ScoreResponse = response.json().await?;
        if payload.results.len() != texts.len() {
            return Err(anyhow!(
                "scoring endpoint returned {} results for {} texts",
                payload.results.len(),
                texts.len()
            ));
        }

        Ok(payload.results.iter().map(convert_result).collect())
    }

    fn model_id(&self) -> &str {
        &self.config.model_id
    }
}

fn convert_result(dto: &ScoreResultDto) -> ScoreOutcome {
    let Some(label) = SentimentLabel::parse(&dto.label) else {
        tracing::warn!("Unknown sentiment label {:?}, scoring neutral", dto.label);
        return ScoreOutcome {
            label: SentimentLabel::Neutral,
            probability: 0.0,
        };
    };
    ScoreOutcome {
        label,
        probability: dto.probability.clamp(0.0, 1.0),
    }
}

#[derive(Serialize)]
struct ScoreRequest<'a> {
    texts: &'a [String],
}

#[derive(Deserialize)]
struct ScoreResponse {
    results: Vec<ScoreResultDto>,
}

#[derive(Deserialize)]
struct ScoreResultDto {
    label: String,
    probability: f64,
}
