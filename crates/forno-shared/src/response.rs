//! The uniform API envelope.
//!
//! Every response body is `{success, message?, data?, error?}`; listings
//! additionally carry a top-level `pagination` block.

use serde::{Deserialize, Serialize};

use crate::dto::Pagination;

/// Standard successful API response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    pub fn ok_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    /// A bodyless success, e.g. after a delete.
    pub fn message_only(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: None,
        }
    }
}

/// Successful listing envelope with its pagination block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub success: bool,
    pub data: Vec<T>,
    pub pagination: Pagination,
}

impl<T> ListResponse<T> {
    pub fn new(data: Vec<T>, pagination: Pagination) -> Self {
        Self {
            success: true,
            data,
            pagination,
        }
    }
}

/// Failure envelope. `error` carries caller-actionable detail (validation
/// messages); internal detail stays in the server logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            error: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.error = Some(detail.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_envelope_omits_empty_fields() {
        let json = serde_json::to_string(&ApiResponse::ok(42)).unwrap();
        assert_eq!(json, r#"{"success":true,"data":42}"#);
    }

    #[test]
    fn error_envelope_shape() {
        let body = ErrorBody::new("Blog not found");
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, r#"{"success":false,"message":"Blog not found"}"#);
    }

    #[test]
    fn error_envelope_carries_detail() {
        let body = ErrorBody::new("Validation failed").with_detail("Title is required");
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(
            json,
            r#"{"success":false,"message":"Validation failed","error":"Title is required"}"#
        );
    }
}
