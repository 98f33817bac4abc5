use crate::github::UploadOutcome;
use serde::Serialize;
use serde_json::Value;

pub const UPLOADED: &str = "image uploaded successfully";
pub const UPLOADED_WITHOUT_URL: &str = "upload succeeded but no image URL was returned";
const UPSTREAM_FAILED: &str = "GitHub API request failed.";

/// The JSON envelope every request is answered with.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResult {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,
}

impl UploadResult {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            image_url: None,
            http_code: None,
            response: None,
        }
    }
}

impl From<UploadOutcome> for UploadResult {
    fn from(outcome: UploadOutcome) -> Self {
        match outcome {
            UploadOutcome::Created { url } => Self {
                success: true,
                message: UPLOADED.to_owned(),
                image_url: Some(url),
                http_code: None,
                response: None,
            },
            UploadOutcome::CreatedWithoutUrl { raw } => Self {
                response: raw,
                ..Self::failure(UPLOADED_WITHOUT_URL)
            },
            UploadOutcome::Rejected {
                status,
                detail,
                raw,
            } => Self {
                http_code: Some(status),
                response: raw,
                ..Self::failure(format!(
                    "{UPSTREAM_FAILED} HTTP status: {status}. Error: {}",
                    detail.as_deref().unwrap_or("unknown error")
                ))
            },
            UploadOutcome::Transport { detail } => {
                Self::failure(format!("{UPSTREAM_FAILED} Transport error: {detail}"))
            }
        }
    }
}
