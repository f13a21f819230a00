use serde::{Deserialize, Serialize};

/// Application error codes following the pattern E{area}{sequence}
///
/// Ranges:
/// - E0xxx: Shared/validation errors
/// - E1xxx: Profile scoring errors
/// - E2xxx: Social graph errors
/// - E3xxx: Matching errors
/// - E4xxx: Notification feed errors
/// - E5xxx: Sync gateway errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Shared (E0xxx)
    InternalError,
    ValidationError,
    NotFound,
    BadRequest,

    // Profile (E1xxx)
    IncompleteAnswers,
    UnknownQuestion,
    UnknownOption,
    DuplicateAnswer,
    TasteOutOfRange,

    // Graph (E2xxx)
    UnknownUser,
    SelfFollow,

    // Feed (E4xxx)
    DuplicateEvent,
    NotificationNotFound,

    // Gateway (E5xxx)
    SyncRejected,
    UpstreamUnavailable,
}

impl ErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            // Shared
            Self::InternalError => "E0001",
            Self::ValidationError => "E0002",
            Self::NotFound => "E0003",
            Self::BadRequest => "E0004",

            // Profile
            Self::IncompleteAnswers => "E1001",
            Self::UnknownQuestion => "E1002",
            Self::UnknownOption => "E1003",
            Self::DuplicateAnswer => "E1004",
            Self::TasteOutOfRange => "E1005",

            // Graph
            Self::UnknownUser => "E2001",
            Self::SelfFollow => "E2002",

            // Feed
            Self::DuplicateEvent => "E4001",
            Self::NotificationNotFound => "E4002",

            // Gateway
            Self::SyncRejected => "E5001",
            Self::UpstreamUnavailable => "E5002",
        }
    }

    /// Reverse mapping used when decoding backend error envelopes.
    pub fn from_code(code: &str) -> Option<Self> {
        let all = [
            Self::InternalError,
            Self::ValidationError,
            Self::NotFound,
            Self::BadRequest,
            Self::IncompleteAnswers,
            Self::UnknownQuestion,
            Self::UnknownOption,
            Self::DuplicateAnswer,
            Self::TasteOutOfRange,
            Self::UnknownUser,
            Self::SelfFollow,
            Self::DuplicateEvent,
            Self::NotificationNotFound,
            Self::SyncRejected,
            Self::UpstreamUnavailable,
        ];
        all.into_iter().find(|c| c.code() == code)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Known {
        code: ErrorCode,
        message: String,
        details: Option<serde_json::Value>,
    },

    #[error("internal error")]
    Internal(#[from] anyhow::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Known {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(code: ErrorCode, message: impl Into<String>, details: serde_json::Value) -> Self {
        Self::Known {
            code,
            message: message.into(),
            details: Some(details),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRequest, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// The typed code, where one is known.
    pub fn error_code(&self) -> Option<ErrorCode> {
        match self {
            Self::Known { code, .. } => Some(*code),
            Self::Internal(_) => Some(ErrorCode::InternalError),
            Self::Http(_) => Some(ErrorCode::UpstreamUnavailable),
            Self::Validation(_) => Some(ErrorCode::ValidationError),
        }
    }

    pub fn is_code(&self, code: ErrorCode) -> bool {
        self.error_code() == Some(code)
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip() {
        assert_eq!(ErrorCode::SelfFollow.code(), "E2002");
        assert_eq!(ErrorCode::from_code("E2002"), Some(ErrorCode::SelfFollow));
        assert_eq!(ErrorCode::from_code("E9999"), None);
    }

    #[test]
    fn known_error_exposes_code() {
        let err = AppError::new(ErrorCode::UnknownUser, "no such user");
        assert!(err.is_code(ErrorCode::UnknownUser));
        assert_eq!(err.to_string(), "no such user");
    }

    #[test]
    fn details_are_attached() {
        let err = AppError::with_details(
            ErrorCode::IncompleteAnswers,
            "missing answers",
            serde_json::json!({"missing": ["food_style"]}),
        );
        match err {
            AppError::Known { details: Some(d), .. } => {
                assert_eq!(d["missing"][0], "food_style");
            }
            other => panic!("unexpected error shape: {other:?}"),
        }
    }
}
