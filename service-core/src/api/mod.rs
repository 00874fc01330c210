//! Wire contract for `POST /api/generate-qr`, shared by the service and its clients.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use validator::Validate;

pub const GENERATE_QR_PATH: &str = "/api/generate-qr";

/// Suffix appended to the roll number to form the download filename.
pub const DOWNLOAD_SUFFIX: &str = "_qr.png";

/// Request body. `rollNumber` is trimmed on the way in; an empty result fails
/// validation the same way a missing field does.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct GenerateQrRequest {
    #[serde(
        rename = "rollNumber",
        default,
        deserialize_with = "trimmed",
        skip_serializing_if = "Option::is_none"
    )]
    #[validate(
        required(message = "Roll number is required"),
        length(min = 1, message = "Roll number is required")
    )]
    pub roll_number: Option<String>,
}

impl GenerateQrRequest {
    pub fn new(roll_number: impl Into<String>) -> Self {
        Self {
            roll_number: Some(roll_number.into()),
        }
    }
}

fn trimmed<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.map(|s| s.trim().to_string()))
}

/// Machine-readable failure kind carried next to the human-readable message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidInput,
    GenerationFailed,
    GenerationTimeout,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::InvalidInput => "invalid_input",
            ErrorCode::GenerationFailed => "generation_failed",
            ErrorCode::GenerationTimeout => "generation_timeout",
        };
        f.write_str(s)
    }
}

/// Response envelope: either a base64 PNG or a failure message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QrResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,
}

impl QrResponse {
    pub fn success(image: String) -> Self {
        Self {
            success: true,
            image: Some(image),
            message: None,
            code: None,
        }
    }

    pub fn failure(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            success: false,
            image: None,
            message: Some(message.into()),
            code: Some(code),
        }
    }
}

/// Liveness payload for `GET /`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    pub message: String,
}
