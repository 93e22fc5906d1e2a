//! Hugging Face style inference API client
//!
//! Both pipelines are served at `{endpoint}/models/{model_id}`:
//! - zero-shot: `{"inputs": text, "parameters": {"candidate_labels": [...]}}`
//!   answers `{"labels": [...], "scores": [...]}`
//! - sentiment: `{"inputs": text}` answers `[[{"label", "score"}, ...]]`
//!   (some deployments drop the outer list)

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tagdesk_common::config::InferenceConfig;

use super::{
    bucket_sentiment, parse_sentiment_label, remap_category, Classification, ClassifierError,
    ComplaintClassifier, Thresholds, CATEGORY_LABELS,
};

const USER_AGENT: &str = concat!("tagdesk/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Serialize)]
struct ZeroShotRequest<'a> {
    inputs: &'a str,
    parameters: ZeroShotParameters<'a>,
}

#[derive(Debug, Serialize)]
struct ZeroShotParameters<'a> {
    candidate_labels: Vec<&'a str>,
}

#[derive(Debug, Deserialize)]
struct ZeroShotResponse {
    labels: Vec<String>,
    scores: Vec<f64>,
}

#[derive(Debug, Serialize)]
struct TextRequest<'a> {
    inputs: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
struct LabelScore {
    label: String,
    score: f64,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SentimentResponse {
    Batched(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
}

impl SentimentResponse {
    /// Highest scoring label for the single input
    fn top(self) -> Option<LabelScore> {
        let scores = match self {
            SentimentResponse::Batched(batches) => batches.into_iter().next()?,
            SentimentResponse::Flat(scores) => scores,
        };
        scores.into_iter().max_by(|a, b| a.score.total_cmp(&b.score))
    }
}

/// Remote classifier backed by two hosted pipelines
pub struct InferenceClient {
    http_client: reqwest::Client,
    base_url: String,
    api_token: Option<String>,
    category_model: String,
    sentiment_model: String,
    thresholds: Thresholds,
}

impl InferenceClient {
    /// Create a client for the configured endpoint
    pub fn new(config: &InferenceConfig) -> Result<Self, ClassifierError> {
        let base_url = config
            .endpoint
            .as_deref()
            .ok_or_else(|| ClassifierError::Config("inference endpoint not configured".to_string()))?
            .trim_end_matches('/')
            .to_string();

        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ClassifierError::Config(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url,
            api_token: config.api_token.clone(),
            category_model: config.category_model.clone(),
            sentiment_model: config.sentiment_model.clone(),
            thresholds: Thresholds::from(config),
        })
    }

    fn model_url(&self, model: &str) -> String {
        format!("{}/models/{}", self.base_url, model)
    }

    async fn post_json<B, T>(&self, model: &str, body: &B) -> Result<T, ClassifierError>
    where
        B: Serialize + ?Sized,
        T: for<'de> Deserialize<'de>,
    {
        let url = self.model_url(model);
        tracing::debug!(url = %url, "Querying inference API");

        let mut request = self.http_client.post(&url).json(body);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ClassifierError::Timeout(e.to_string())
            } else {
                ClassifierError::Network(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ClassifierError::Api(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ClassifierError::Parse(e.to_string()))
    }

    async fn zero_shot(&self, text: &str) -> Result<ZeroShotResponse, ClassifierError> {
        let request = ZeroShotRequest {
            inputs: text,
            parameters: ZeroShotParameters {
                candidate_labels: CATEGORY_LABELS.iter().map(|(label, _)| *label).collect(),
            },
        };
        let response: ZeroShotResponse = self.post_json(&self.category_model, &request).await?;
        if response.labels.len() != response.scores.len() {
            return Err(ClassifierError::Parse(format!(
                "zero-shot returned {} labels but {} scores",
                response.labels.len(),
                response.scores.len()
            )));
        }
        Ok(response)
    }

    async fn sentiment(&self, text: &str) -> Result<LabelScore, ClassifierError> {
        let response: SentimentResponse = self
            .post_json(&self.sentiment_model, &TextRequest { inputs: text })
            .await?;
        response
            .top()
            .ok_or_else(|| ClassifierError::Parse("sentiment response contained no labels".to_string()))
    }
}

#[async_trait]
impl ComplaintClassifier for InferenceClient {
    fn name(&self) -> &'static str {
        "inference-api"
    }

    async fn classify(&self, text: &str) -> Result<Classification, ClassifierError> {
        let (zero_shot, sentiment) = tokio::try_join!(self.zero_shot(text), self.sentiment(text))?;

        let (category, category_score) =
            remap_category(&zero_shot.labels, &zero_shot.scores, self.thresholds.min_category);

        let raw_label = parse_sentiment_label(&sentiment.label).ok_or_else(|| {
            ClassifierError::Parse(format!("unknown sentiment label: {}", sentiment.label))
        })?;
        let (sentiment_label, sentiment_score) =
            bucket_sentiment(raw_label, sentiment.score, self.thresholds.neutral);

        tracing::debug!(
            category = %category,
            category_score,
            raw_sentiment = %sentiment.label,
            sentiment = %sentiment_label,
            sentiment_score,
            "Inference classification complete"
        );

        Ok(Classification {
            category,
            category_score,
            sentiment: sentiment_label,
            sentiment_score,
        })
    }
}
