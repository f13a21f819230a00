use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult, ErrorCode};

/// Success envelope produced by the BobMap REST backend.
///
/// Every endpoint wraps its payload as `{"success": true, "data": ...}`,
/// optionally with a human-readable message. The client decodes this shape
/// and unwraps `data`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            message: None,
        }
    }

    pub fn into_data(self) -> T {
        self.data
    }
}

/// Error envelope produced by the backend: `{"success": false, "error": {...}}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub success: bool,
    pub error: ApiErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    /// Convert a decoded error envelope into an [`AppError`].
    ///
    /// Unrecognized backend codes collapse to `SyncRejected` so callers
    /// always see a typed error.
    pub fn into_result<T>(self) -> AppResult<T> {
        let code = ErrorCode::from_code(&self.error.code).unwrap_or(ErrorCode::SyncRejected);
        Err(match self.error.details {
            Some(details) => AppError::with_details(code, self.error.message, details),
            None => AppError::new(code, self.error.message),
        })
    }
}
