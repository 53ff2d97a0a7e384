use crate::permissions::Permission;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const ERROR_CODE_PERMISSION_DENIED: &str = "ERROR_CODE_PERMISSION_DENIED";
pub const ERROR_CODE_CANCEL: &str = "ERROR_CODE_CANCEL";
pub const ERROR_CODE_REQUEST_PENDING: &str = "ERROR_CODE_REQUEST_PENDING";
pub const ERROR_CODE_SUPERSEDED: &str = "ERROR_CODE_SUPERSEDED";
pub const ERROR_CODE_INVALID_ARGUMENTS: &str = "ERROR_CODE_INVALID_ARGUMENTS";
pub const ERROR_CODE_UNSUPPORTED: &str = "ERROR_CODE_UNSUPPORTED";
pub const ERROR_CODE_PLATFORM: &str = "ERROR_CODE_PLATFORM";
pub const ERROR_CODE_CONFIG: &str = "ERROR_CODE_CONFIG";
pub const ERROR_CODE_INTERNAL: &str = "ERROR_CODE_INTERNAL";

/// Failures surfaced on the error path of a screen recording request.
///
/// Recorder runtime errors are not part of this type: they travel on the
/// `onRecorderListener` push channel as raw integer codes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScreenRecordError {
    #[error("Permission denied: {}", format_permissions(.denied))]
    PermissionDenied { denied: Vec<Permission> },

    #[error("Screen capture request cancelled (result code {result_code})")]
    UserCancelled { result_code: i32 },

    #[error("A screen recording request is already pending")]
    RequestPending,

    #[error("Screen recording request superseded by a newer request")]
    Superseded,

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Unsupported: {0}")]
    Unsupported(String),

    #[error("Platform error: {0}")]
    Platform(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal lock poisoned")]
    PoisonedLock,
}

fn format_permissions(permissions: &[Permission]) -> String {
    if permissions.is_empty() {
        return "no permission result".to_string();
    }
    permissions
        .iter()
        .map(|p| p.as_android_str())
        .collect::<Vec<_>>()
        .join(", ")
}

impl ScreenRecordError {
    /// Stable wire code used on the error path of a method call.
    pub fn code(&self) -> &'static str {
        match self {
            ScreenRecordError::PermissionDenied { .. } => ERROR_CODE_PERMISSION_DENIED,
            ScreenRecordError::UserCancelled { .. } => ERROR_CODE_CANCEL,
            ScreenRecordError::RequestPending => ERROR_CODE_REQUEST_PENDING,
            ScreenRecordError::Superseded => ERROR_CODE_SUPERSEDED,
            ScreenRecordError::InvalidArguments(_) => ERROR_CODE_INVALID_ARGUMENTS,
            ScreenRecordError::Unsupported(_) => ERROR_CODE_UNSUPPORTED,
            ScreenRecordError::Platform(_) => ERROR_CODE_PLATFORM,
            ScreenRecordError::Config(_) => ERROR_CODE_CONFIG,
            ScreenRecordError::PoisonedLock => ERROR_CODE_INTERNAL,
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            ScreenRecordError::PermissionDenied { denied } if !denied.is_empty() => Some(
                serde_json::json!({
                    "denied": denied.iter().map(|p| p.as_android_str()).collect::<Vec<_>>()
                }),
            ),
            ScreenRecordError::UserCancelled { result_code } => {
                Some(serde_json::json!({ "resultCode": result_code }))
            }
            _ => None,
        }
    }
}

impl<T> From<std::sync::PoisonError<T>> for ScreenRecordError {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        ScreenRecordError::PoisonedLock
    }
}

/// Error shape handed back across the method-call boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub code: String,
    pub message: Option<String>,
    pub details: Option<serde_json::Value>,
}

impl From<ScreenRecordError> for ErrorPayload {
    fn from(error: ScreenRecordError) -> Self {
        ErrorPayload {
            code: error.code().to_string(),
            details: error.details(),
            message: Some(error.to_string()),
        }
    }
}

impl std::fmt::Display for ErrorPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{}: {}", self.code, message),
            None => write!(f, "{}", self.code),
        }
    }
}

pub type ScreenRecordResult<T> = Result<T, ScreenRecordError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_codes() {
        let denied = ScreenRecordError::PermissionDenied {
            denied: vec![Permission::RecordAudio],
        };
        assert_eq!(denied.code(), "ERROR_CODE_PERMISSION_DENIED");
        assert_eq!(
            ScreenRecordError::UserCancelled { result_code: 0 }.code(),
            "ERROR_CODE_CANCEL"
        );
    }

    #[test]
    fn test_payload_carries_denied_permissions() {
        let payload: ErrorPayload = ScreenRecordError::PermissionDenied {
            denied: vec![Permission::RecordAudio, Permission::WriteExternalStorage],
        }
        .into();

        assert_eq!(payload.code, ERROR_CODE_PERMISSION_DENIED);
        let details = payload.details.unwrap();
        assert_eq!(details["denied"][0], "android.permission.RECORD_AUDIO");
        assert_eq!(details["denied"][1], "android.permission.WRITE_EXTERNAL_STORAGE");
    }

    #[test]
    fn test_empty_denial_message() {
        let error = ScreenRecordError::PermissionDenied { denied: vec![] };
        assert_eq!(error.to_string(), "Permission denied: no permission result");
        let payload: ErrorPayload = error.into();
        assert!(payload.details.is_none());
    }
}
