//! Complaint submission validation
//!
//! All rules are checked and every violation is reported, so a client can
//! fix a request in one round trip.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use tagdesk_common::config::ValidationConfig;
use utoipa::ToSchema;

use crate::error::FieldError;

/// Longest accepted email address (RFC 5321 path limit)
pub const MAX_EMAIL_LEN: usize = 254;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_%+\-]+(?:\.[A-Za-z0-9_%+\-]+)*@[A-Za-z0-9](?:[A-Za-z0-9\-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9\-]*[A-Za-z0-9])?)*\.[A-Za-z]{2,}$")
        .expect("email pattern compiles")
});

/// POST /complaints request body
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateComplaintRequest {
    /// Customer identifier, must be positive
    #[schema(example = 1001)]
    pub customer_id: i64,
    /// Complaint text
    #[schema(example = "I was charged twice for my subscription this month.")]
    pub message: String,
    /// Contact address
    #[schema(example = "jane@example.com")]
    pub email: String,
}

/// Submission rules built from configuration
#[derive(Debug, Clone)]
pub struct ValidationRules {
    min_message_len: usize,
    max_message_len: usize,
    /// Lowercased, blank entries removed
    spam_phrases: Vec<String>,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self::new(&ValidationConfig::default())
    }
}

impl ValidationRules {
    pub fn new(config: &ValidationConfig) -> Self {
        Self {
            min_message_len: config.min_message_len,
            max_message_len: config.max_message_len,
            spam_phrases: config
                .spam_phrases
                .iter()
                .map(|p| p.trim().to_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    /// Check a submission, returning every violated rule
    pub fn validate(&self, request: &CreateComplaintRequest) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();

        if request.customer_id <= 0 {
            errors.push(FieldError::new(
                &["body", "customer_id"],
                "customer_id must be greater than 0",
                "value_error.number.not_gt",
            ));
        }

        // Length counts characters, not bytes
        let length = request.message.chars().count();
        if length < self.min_message_len {
            errors.push(FieldError::new(
                &["body", "message"],
                format!("message must have at least {} characters", self.min_message_len),
                "value_error.any_str.min_length",
            ));
        } else if length > self.max_message_len {
            errors.push(FieldError::new(
                &["body", "message"],
                format!("message must have at most {} characters", self.max_message_len),
                "value_error.any_str.max_length",
            ));
        }

        if let Some(phrase) = self.find_spam(&request.message) {
            errors.push(FieldError::new(
                &["body", "message"],
                format!("message contains a blocked phrase: '{}'", phrase),
                "value_error.spam",
            ));
        }

        if !is_valid_email(&request.email) {
            errors.push(FieldError::new(
                &["body", "email"],
                "value is not a valid email address",
                "value_error.email",
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// First configured spam phrase found in `message` (case-insensitive)
    pub fn find_spam(&self, message: &str) -> Option<&str> {
        let lower = message.to_lowercase();
        self.spam_phrases
            .iter()
            .find(|phrase| lower.contains(phrase.as_str()))
            .map(String::as_str)
    }
}

/// Syntactic email check (`local@domain.tld`, dot-atom local part)
pub fn is_valid_email(email: &str) -> bool {
    email.len() <= MAX_EMAIL_LEN && EMAIL_RE.is_match(email)
}
