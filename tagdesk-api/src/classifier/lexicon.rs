//! Offline keyword classifier
//!
//! Used when no inference endpoint is configured. Produces outputs shaped
//! like the hosted pipelines (per-label scores and a binary polarity with a
//! confidence) so the same remapping thresholds apply.

use async_trait::async_trait;
use tagdesk_common::db::{Category, Sentiment};

use super::{
    bucket_sentiment, remap_category, Classification, ClassifierError, ComplaintClassifier,
    Thresholds, CATEGORY_LABELS,
};

const CATEGORY_KEYWORDS: &[(Category, &[&str])] = &[
    (
        Category::Billing,
        &[
            "bill", "billed", "billing", "charge", "charged", "invoice", "refund", "payment",
            "paid", "overcharged", "subscription", "fee", "price", "card",
        ],
    ),
    (
        Category::Technical,
        &[
            "error", "crash", "crashes", "crashed", "bug", "broken", "app", "website", "slow",
            "outage", "freezes", "not working", "down", "update",
        ],
    ),
    (
        Category::Delivery,
        &[
            "delivery", "delivered", "shipping", "shipped", "shipment", "package", "parcel",
            "courier", "late", "tracking", "arrived", "arrive",
        ],
    ),
    (
        Category::Product,
        &[
            "quality", "defective", "damaged", "faulty", "product", "item", "size", "broke",
            "cheap", "material", "works",
        ],
    ),
    (
        Category::Account,
        &[
            "account", "password", "login", "log in", "sign in", "profile", "locked", "username",
            "email address", "verification",
        ],
    ),
];

const POSITIVE_WORDS: &[&str] = &[
    "good", "great", "excellent", "thanks", "thank", "happy", "love", "amazing", "helpful",
    "resolved", "satisfied", "quick", "perfect", "appreciate", "pleased", "fantastic",
];

const NEGATIVE_WORDS: &[&str] = &[
    "bad", "terrible", "awful", "angry", "worst", "disappointed", "unacceptable", "horrible",
    "hate", "frustrated", "frustrating", "useless", "poor", "ridiculous", "furious", "scam",
    "never", "broken", "damaged", "rude", "waste",
];

/// Keyword and polarity-word classifier
#[derive(Debug, Clone, Default)]
pub struct LexiconClassifier {
    thresholds: Thresholds,
}

impl LexiconClassifier {
    pub fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    /// Category label scores normalized to sum to 1 (all zero when nothing matched)
    fn category_scores(text: &Normalized) -> (Vec<String>, Vec<f64>) {
        let hits: Vec<usize> = CATEGORY_KEYWORDS
            .iter()
            .map(|(_, keywords)| keywords.iter().filter(|k| text.contains(k)).count())
            .collect();
        let total: usize = hits.iter().sum();

        let labels = CATEGORY_KEYWORDS
            .iter()
            .map(|(category, _)| label_for(*category).to_string())
            .collect();
        let scores = hits
            .iter()
            .map(|&h| if total == 0 { 0.0 } else { h as f64 / total as f64 })
            .collect();
        (labels, scores)
    }

    /// Binary polarity with a confidence in [0.5, 1)
    ///
    /// Ties report POSITIVE at 0.5, which the neutral band absorbs.
    fn polarity(text: &Normalized) -> (Sentiment, f64) {
        let pos = POSITIVE_WORDS.iter().filter(|w| text.contains(w)).count() as f64;
        let neg = NEGATIVE_WORDS.iter().filter(|w| text.contains(w)).count() as f64;
        let score = 0.5 + 0.5 * (pos - neg).abs() / (pos + neg + 1.0);
        if neg > pos {
            (Sentiment::Negative, score)
        } else {
            (Sentiment::Positive, score)
        }
    }
}

#[async_trait]
impl ComplaintClassifier for LexiconClassifier {
    fn name(&self) -> &'static str {
        "lexicon"
    }

    async fn classify(&self, text: &str) -> Result<Classification, ClassifierError> {
        let normalized = Normalized::new(text);

        let (labels, scores) = Self::category_scores(&normalized);
        let (category, category_score) =
            remap_category(&labels, &scores, self.thresholds.min_category);

        let (raw, raw_score) = Self::polarity(&normalized);
        let (sentiment, sentiment_score) = bucket_sentiment(raw, raw_score, self.thresholds.neutral);

        Ok(Classification {
            category,
            category_score,
            sentiment,
            sentiment_score,
        })
    }
}

fn label_for(category: Category) -> &'static str {
    CATEGORY_LABELS
        .iter()
        .find(|(_, c)| *c == category)
        .map(|(label, _)| *label)
        .unwrap_or("other")
}

/// Lowercased words joined by single spaces, padded for whole-word matching
struct Normalized(String);

impl Normalized {
    fn new(text: &str) -> Self {
        let words: Vec<String> = text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(|w| w.to_lowercase())
            .collect();
        Self(format!(" {} ", words.join(" ")))
    }

    fn contains(&self, phrase: &str) -> bool {
        self.0.contains(&format!(" {} ", phrase))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn classify(text: &str) -> Classification {
        LexiconClassifier::default().classify(text).await.unwrap()
    }

    #[test]
    fn test_whole_word_matching() {
        let text = Normalized::new("Billing! My BILL was wrong; can't log-in.");
        assert!(text.contains("bill"));
        assert!(text.contains("billing"));
        assert!(text.contains("log in"));
        assert!(!text.contains("bil"));
    }

    #[tokio::test]
    async fn test_billing_complaint() {
        let result = classify("I was charged twice and the refund never came. Terrible.").await;
        assert_eq!(result.category, Category::Billing);
        assert_eq!(result.sentiment, Sentiment::Negative);
        assert!(result.sentiment_score >= 0.6);
    }

    #[tokio::test]
    async fn test_delivery_complaint() {
        let result = classify("The parcel arrived late and the tracking was wrong").await;
        assert_eq!(result.category, Category::Delivery);
    }

    #[tokio::test]
    async fn test_account_complaint() {
        let result = classify("My account is locked and the password reset fails").await;
        assert_eq!(result.category, Category::Account);
    }

    #[tokio::test]
    async fn test_no_keywords_is_other_and_neutral() {
        let result = classify("I would like to talk to somebody about yesterday").await;
        assert_eq!(result.category, Category::Other);
        assert_eq!(result.category_score, 0.0);
        assert_eq!(result.sentiment, Sentiment::Neutral);
        assert_eq!(result.sentiment_score, 0.5);
    }

    #[tokio::test]
    async fn test_strong_negative_scores_high() {
        let result = classify("Worst service ever, absolutely unacceptable and horrible").await;
        assert_eq!(result.sentiment, Sentiment::Negative);
        assert!(result.sentiment_score >= 0.8, "score was {}", result.sentiment_score);
    }

    #[tokio::test]
    async fn test_positive_feedback() {
        let result = classify("Thanks, the support team was helpful and quick").await;
        assert_eq!(result.sentiment, Sentiment::Positive);
    }
}
