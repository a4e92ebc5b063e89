// Submission response models

use serde::{Deserialize, Serialize};

pub const SUCCESS_MESSAGE: &str = "Thank you for your inquiry! We'll get back to you soon.";
pub const FAILURE_MESSAGE: &str = "Failed to submit form. Please try again.";

/// Outcome of one submit attempt, shown to the user and then discarded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionResult {
    pub success: bool,
    pub message: String,
}

impl SubmissionResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// What a gateway hands back when the backend accepted a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    pub correlation_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
