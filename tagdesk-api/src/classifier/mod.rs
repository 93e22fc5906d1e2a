//! Complaint tagging
//!
//! A complaint is tagged by two model calls: a zero-shot classification over
//! a fixed set of candidate labels (mapped onto [`Category`]) and a binary
//! sentiment classification (bucketed into [`Sentiment`] with a neutral band).
//!
//! - [`InferenceClient`] calls a Hugging Face style inference API
//! - [`LexiconClassifier`] is the offline fallback

mod inference_client;
mod lexicon;

pub use inference_client::InferenceClient;
pub use lexicon::LexiconClassifier;

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tagdesk_common::config::InferenceConfig;
use tagdesk_common::db::{Category, Sentiment};
use thiserror::Error;
use tracing::{info, warn};

/// Zero-shot candidate labels and the category each one selects
pub const CATEGORY_LABELS: &[(&str, Category)] = &[
    ("billing or payment issue", Category::Billing),
    ("technical problem", Category::Technical),
    ("delivery or shipping problem", Category::Delivery),
    ("product quality", Category::Product),
    ("account or login issue", Category::Account),
];

/// Inference errors
#[derive(Debug, Error)]
pub enum ClassifierError {
    /// Network communication error
    #[error("Network error: {0}")]
    Network(String),

    /// Inference endpoint did not answer in time
    #[error("Inference request timed out: {0}")]
    Timeout(String),

    /// Inference endpoint returned an error response
    #[error("Inference API error {0}: {1}")]
    Api(u16, String),

    /// Response could not be interpreted
    #[error("Parse error: {0}")]
    Parse(String),

    /// Client could not be constructed
    #[error("Classifier configuration error: {0}")]
    Config(String),
}

/// Result of tagging one complaint
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Classification {
    pub category: Category,
    /// Zero-shot score of the winning label (0 when no label applied)
    pub category_score: f64,
    pub sentiment: Sentiment,
    /// Model confidence for the raw sentiment label, in [0, 1]
    pub sentiment_score: f64,
}

/// Post-hoc label remapping thresholds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// Raw sentiment scores below this become NEUTRAL
    pub neutral: f64,
    /// Best zero-shot scores below this become OTHER
    pub min_category: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            neutral: 0.60,
            min_category: 0.30,
        }
    }
}

impl From<&InferenceConfig> for Thresholds {
    fn from(config: &InferenceConfig) -> Self {
        Self {
            neutral: config.neutral_threshold,
            min_category: config.min_category_score,
        }
    }
}

/// Assigns a category and sentiment to complaint text
#[async_trait]
pub trait ComplaintClassifier: Send + Sync {
    /// Short identifier reported by the health endpoint
    fn name(&self) -> &'static str;

    /// Tag one complaint message
    async fn classify(&self, text: &str) -> Result<Classification, ClassifierError>;
}

/// Pick the category for a zero-shot result
///
/// `labels` and `scores` are parallel. Unknown labels are ignored; when no
/// known label reaches `min_score` the complaint is OTHER.
pub fn remap_category(labels: &[String], scores: &[f64], min_score: f64) -> (Category, f64) {
    let best = labels
        .iter()
        .zip(scores.iter().copied())
        .filter_map(|(label, score)| category_for_label(label).map(|c| (c, score)))
        .max_by(|a, b| a.1.total_cmp(&b.1));

    match best {
        Some((category, score)) if score >= min_score => (category, score.clamp(0.0, 1.0)),
        Some((_, score)) => (Category::Other, score.clamp(0.0, 1.0)),
        None => (Category::Other, 0.0),
    }
}

/// Three-way sentiment bucketing of a binary model output
///
/// Below `neutral_threshold` the label becomes NEUTRAL; the score is kept.
pub fn bucket_sentiment(label: Sentiment, score: f64, neutral_threshold: f64) -> (Sentiment, f64) {
    let score = score.clamp(0.0, 1.0);
    if score < neutral_threshold {
        (Sentiment::Neutral, score)
    } else {
        (label, score)
    }
}

/// Interpret a raw model label
///
/// Accepts POSITIVE/NEGATIVE/NEUTRAL in any case (and abbreviations such as
/// "pos"), plus the generic LABEL_0/LABEL_1 names of binary SST-2 heads.
pub fn parse_sentiment_label(label: &str) -> Option<Sentiment> {
    let lower = label.trim().to_ascii_lowercase();
    match lower.as_str() {
        "label_0" => Some(Sentiment::Negative),
        "label_1" => Some(Sentiment::Positive),
        s if s.starts_with("pos") => Some(Sentiment::Positive),
        s if s.starts_with("neg") => Some(Sentiment::Negative),
        s if s.starts_with("neu") => Some(Sentiment::Neutral),
        _ => None,
    }
}

fn category_for_label(label: &str) -> Option<Category> {
    CATEGORY_LABELS
        .iter()
        .find(|(candidate, _)| candidate.eq_ignore_ascii_case(label))
        .map(|(_, category)| *category)
}

/// Choose the classifier for a configuration
///
/// A configured endpoint selects [`InferenceClient`]; otherwise complaints
/// are tagged offline by [`LexiconClassifier`].
pub fn build_classifier(config: &InferenceConfig) -> Result<Arc<dyn ComplaintClassifier>, ClassifierError> {
    match config.endpoint.as_deref() {
        Some(endpoint) => {
            let client = InferenceClient::new(config)?;
            info!(
                endpoint = %endpoint,
                category_model = %config.category_model,
                sentiment_model = %config.sentiment_model,
                "Using remote inference classifier"
            );
            Ok(Arc::new(client))
        }
        None => {
            warn!("No inference endpoint configured, tagging complaints with the offline lexicon classifier");
            Ok(Arc::new(LexiconClassifier::new(Thresholds::from(config))))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_remap_category_picks_best_known_label() {
        let (category, score) = remap_category(
            &labels(&["technical problem", "billing or payment issue", "product quality"]),
            &[0.2, 0.7, 0.1],
            0.3,
        );
        assert_eq!(category, Category::Billing);
        assert_eq!(score, 0.7);
    }

    #[test]
    fn test_remap_category_below_threshold_is_other() {
        let (category, score) = remap_category(
            &labels(&["technical problem", "product quality"]),
            &[0.25, 0.2],
            0.3,
        );
        assert_eq!(category, Category::Other);
        assert_eq!(score, 0.25);
    }

    #[test]
    fn test_remap_category_ignores_unknown_labels() {
        let (category, _) = remap_category(
            &labels(&["weather", "Account or login issue"]),
            &[0.9, 0.5],
            0.3,
        );
        assert_eq!(category, Category::Account);

        let (category, score) = remap_category(&labels(&["weather"]), &[0.9], 0.3);
        assert_eq!(category, Category::Other);
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_bucket_sentiment_neutral_band() {
        assert_eq!(bucket_sentiment(Sentiment::Negative, 0.55, 0.6), (Sentiment::Neutral, 0.55));
        assert_eq!(bucket_sentiment(Sentiment::Negative, 0.6, 0.6), (Sentiment::Negative, 0.6));
        assert_eq!(bucket_sentiment(Sentiment::Positive, 0.99, 0.6), (Sentiment::Positive, 0.99));
        assert_eq!(bucket_sentiment(Sentiment::Positive, 1.3, 0.6), (Sentiment::Positive, 1.0));
    }

    #[test]
    fn test_parse_sentiment_label_variants() {
        assert_eq!(parse_sentiment_label("POSITIVE"), Some(Sentiment::Positive));
        assert_eq!(parse_sentiment_label("negative"), Some(Sentiment::Negative));
        assert_eq!(parse_sentiment_label("neutral"), Some(Sentiment::Neutral));
        assert_eq!(parse_sentiment_label("LABEL_0"), Some(Sentiment::Negative));
        assert_eq!(parse_sentiment_label("LABEL_1"), Some(Sentiment::Positive));
        assert_eq!(parse_sentiment_label("mixed"), None);
    }

    #[test]
    fn test_build_classifier_without_endpoint_is_offline() {
        let classifier = build_classifier(&InferenceConfig::default()).unwrap();
        assert_eq!(classifier.name(), "lexicon");
    }

    #[test]
    fn test_build_classifier_with_endpoint_is_remote() {
        let config = InferenceConfig {
            endpoint: Some("http://127.0.0.1:9".to_string()),
            ..Default::default()
        };
        let classifier = build_classifier(&config).unwrap();
        assert_eq!(classifier.name(), "inference-api");
    }
}
