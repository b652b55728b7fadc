use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const SUBMITTED_MESSAGE: &str = "Application submitted successfully";
pub const INVALID_RESOURCES_MESSAGE: &str = "Invalid resources data format";
pub const UPLOAD_FAILED_MESSAGE: &str = "Failed to upload PPT file";
pub const SAVE_FAILED_MESSAGE: &str = "Failed to save application to database";
pub const GENERIC_FAILURE_MESSAGE: &str = "An error occurred during submission";

/// Identifiers assigned to an accepted application.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    #[schema(example = 42)]
    pub application_id: i32,
    /// RFC 3339 timestamp of acceptance.
    pub submitted_at: DateTime<Utc>,
}

/// Envelope returned by the submission endpoint, for success and failure alike.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct SubmitResponse {
    pub success: bool,
    #[schema(example = "Application submitted successfully")]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<SubmissionReceipt>,
}

impl SubmitResponse {
    pub fn submitted(receipt: SubmissionReceipt) -> Self {
        Self {
            success: true,
            message: SUBMITTED_MESSAGE.to_string(),
            data: Some(receipt),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
        }
    }
}
