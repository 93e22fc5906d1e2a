//! Complaint domain model
//!
//! Enumerations are stored as their SCREAMING_SNAKE_CASE names in TEXT
//! columns and serialized the same way over JSON.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::Error;

/// Complaint category assigned by the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Billing,
    Technical,
    Delivery,
    Product,
    Account,
    Other,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Billing,
        Category::Technical,
        Category::Delivery,
        Category::Product,
        Category::Account,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Billing => "BILLING",
            Self::Technical => "TECHNICAL",
            Self::Delivery => "DELIVERY",
            Self::Product => "PRODUCT",
            Self::Account => "ACCOUNT",
            Self::Other => "OTHER",
        }
    }
}

/// Sentiment polarity after three-way bucketing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    pub const ALL: [Sentiment; 3] = [Sentiment::Positive, Sentiment::Neutral, Sentiment::Negative];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "POSITIVE",
            Self::Neutral => "NEUTRAL",
            Self::Negative => "NEGATIVE",
        }
    }
}

/// Complaint lifecycle status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComplaintStatus {
    #[default]
    Open,
    InProgress,
    Closed,
}

impl ComplaintStatus {
    pub const ALL: [ComplaintStatus; 3] = [
        ComplaintStatus::Open,
        ComplaintStatus::InProgress,
        ComplaintStatus::Closed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::InProgress => "IN_PROGRESS",
            Self::Closed => "CLOSED",
        }
    }
}

macro_rules! text_enum_impls {
    ($ty:ty, $what:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == s)
                    .ok_or_else(|| Error::InvalidInput(format!("Unknown {}: {}", $what, s)))
            }
        }
    };
}

text_enum_impls!(Category, "category");
text_enum_impls!(Sentiment, "sentiment");
text_enum_impls!(ComplaintStatus, "status");

/// A persisted complaint record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Complaint {
    #[schema(example = 42)]
    pub id: i64,
    #[schema(example = 1001)]
    pub customer_id: i64,
    #[schema(example = "I was charged twice for my subscription this month.")]
    pub message: String,
    #[schema(example = "jane@example.com")]
    pub email: String,
    pub category: Category,
    pub sentiment: Sentiment,
    /// Classifier confidence for `sentiment`, in [0, 1]
    #[schema(example = 0.93)]
    pub sentiment_score: f64,
    pub status: ComplaintStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Complaint contents ready for insertion
///
/// Category and sentiment are required: a complaint is only persisted once
/// the classifier has tagged it.
#[derive(Debug, Clone)]
pub struct NewComplaint {
    pub customer_id: i64,
    pub message: String,
    pub email: String,
    pub category: Category,
    pub sentiment: Sentiment,
    pub sentiment_score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_text_round_trip() {
        for c in Category::ALL {
            assert_eq!(c.as_str().parse::<Category>().unwrap(), c);
        }
        assert_eq!("IN_PROGRESS".parse::<ComplaintStatus>().unwrap(), ComplaintStatus::InProgress);
    }

    #[test]
    fn test_enum_parse_is_case_sensitive() {
        assert!("billing".parse::<Category>().is_err());
        assert!("Negative".parse::<Sentiment>().is_err());
    }

    #[test]
    fn test_serde_matches_column_text() {
        let json = serde_json::to_string(&ComplaintStatus::InProgress).unwrap();
        assert_eq!(json, "\"IN_PROGRESS\"");
        let parsed: Category = serde_json::from_str("\"DELIVERY\"").unwrap();
        assert_eq!(parsed, Category::Delivery);
    }

    #[test]
    fn test_default_status_is_open() {
        assert_eq!(ComplaintStatus::default(), ComplaintStatus::Open);
    }
}
