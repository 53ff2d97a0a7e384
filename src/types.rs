use serde::{Deserialize, Serialize};

/// `Activity.RESULT_OK`
pub const RESULT_OK: i32 = -1;
/// `Activity.RESULT_CANCELED`
pub const RESULT_CANCELED: i32 = 0;

/// Default request code for the runtime permission dialog
pub const PERMISSIONS_REQUEST_CODE: i32 = 555;
/// Default request code for the screen capture intent
pub const SCREEN_RECORD_REQUEST_CODE: i32 = 333;

/// Push method name for recorder completion/error notifications
pub const METHOD_ON_RECORDER_LISTENER: &str = "onRecorderListener";

/// Options for a single screen recording session.
///
/// Every field is optional. An absent field leaves the recorder's current
/// value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_audio_enabled: Option<bool>,
    #[serde(
        rename = "isRecordHDVideo",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub is_record_hd_video: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_bitrate: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_sampling_rate: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_bitrate: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_frame_rate: Option<i32>,
    /// Raw image bytes for the foreground notification's small icon
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_icon: Option<Vec<u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_button_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_description: Option<String>,
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_output_path(mut self, path: impl Into<String>) -> Self {
        self.output_path = Some(path.into());
        self
    }

    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    pub fn with_audio(mut self, enabled: bool) -> Self {
        self.is_audio_enabled = Some(enabled);
        self
    }

    pub fn with_hd_video(mut self, enabled: bool) -> Self {
        self.is_record_hd_video = Some(enabled);
        self
    }

    /// Parse the argument map of a `startRecordScreen` call. A null or
    /// missing map is an empty config.
    pub fn from_arguments(
        arguments: &serde_json::Value,
    ) -> Result<Self, crate::errors::ScreenRecordError> {
        if arguments.is_null() {
            return Ok(Self::default());
        }
        serde_json::from_value(arguments.clone())
            .map_err(|e| crate::errors::ScreenRecordError::InvalidArguments(e.to_string()))
    }

    /// Number of fields that will be applied to the recorder
    pub fn field_count(&self) -> usize {
        [
            self.output_path.is_some(),
            self.file_name.is_some(),
            self.is_audio_enabled.is_some(),
            self.is_record_hd_video.is_some(),
            self.audio_bitrate.is_some(),
            self.audio_sampling_rate.is_some(),
            self.video_bitrate.is_some(),
            self.video_frame_rate.is_some(),
            self.notification_icon.is_some(),
            self.notification_title.is_some(),
            self.notification_button_text.is_some(),
            self.notification_description.is_some(),
        ]
        .iter()
        .filter(|set| **set)
        .count()
    }
}

/// Opaque handle standing for the platform's capture intent data.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CaptureToken(String);

impl CaptureToken {
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// An accepted screen capture grant, ready to hand to the recorder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureGrant {
    pub token: CaptureToken,
    pub result_code: i32,
}

/// Payload of the `onRecorderListener` push notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecorderNotification {
    pub is_completed: bool,
    pub err_code: i32,
}

impl RecorderNotification {
    pub fn completed() -> Self {
        Self {
            is_completed: true,
            err_code: 0,
        }
    }

    pub fn failed(err_code: i32) -> Self {
        Self {
            is_completed: false,
            err_code,
        }
    }
}

/// Observable state of a coordinator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    AwaitingPermission,
    AwaitingCaptureGrant,
    Recording,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::Idle
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Idle => write!(f, "idle"),
            SessionState::AwaitingPermission => write!(f, "awaiting_permission"),
            SessionState::AwaitingCaptureGrant => write!(f, "awaiting_capture_grant"),
            SessionState::Recording => write!(f, "recording"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_wire_names() {
        let args = serde_json::json!({
            "outputPath": "/tmp",
            "fileName": "a",
            "isAudioEnabled": true,
            "isRecordHDVideo": false,
            "videoFrameRate": 60,
            "notificationIcon": [1, 2, 3]
        });
        let config = SessionConfig::from_arguments(&args).unwrap();
        assert_eq!(config.output_path.as_deref(), Some("/tmp"));
        assert_eq!(config.file_name.as_deref(), Some("a"));
        assert_eq!(config.is_audio_enabled, Some(true));
        assert_eq!(config.is_record_hd_video, Some(false));
        assert_eq!(config.video_frame_rate, Some(60));
        assert_eq!(config.notification_icon, Some(vec![1, 2, 3]));
        assert_eq!(config.audio_bitrate, None);
        assert_eq!(config.field_count(), 6);
    }

    #[test]
    fn test_null_arguments_are_empty_config() {
        let config = SessionConfig::from_arguments(&serde_json::Value::Null).unwrap();
        assert_eq!(config, SessionConfig::default());
        assert_eq!(config.field_count(), 0);
    }

    #[test]
    fn test_bad_argument_type_is_rejected() {
        let args = serde_json::json!({ "audioBitrate": "fast" });
        assert!(SessionConfig::from_arguments(&args).is_err());
    }

    #[test]
    fn test_notification_serialization() {
        let json = serde_json::to_value(RecorderNotification::failed(38)).unwrap();
        assert_eq!(json, serde_json::json!({ "isCompleted": false, "errCode": 38 }));
        let json = serde_json::to_value(RecorderNotification::completed()).unwrap();
        assert_eq!(json, serde_json::json!({ "isCompleted": true, "errCode": 0 }));
    }
}
