//! Fallback for hosts without Android media projection.
//!
//! Every start request resolves with `ERROR_CODE_UNSUPPORTED`; stop and
//! status queries behave as an idle recorder.

use crate::errors::{ScreenRecordError, ScreenRecordResult};
use crate::permissions::Permission;
use crate::platform::Platform;
use crate::recorder::{RecorderEngine, RecorderListener};
use crate::types::CaptureGrant;

const UNSUPPORTED_MESSAGE: &str = "screen capture grants require Android media projection";

#[derive(Debug, Default)]
pub struct UnsupportedPlatform;

impl Platform for UnsupportedPlatform {
    fn missing_permissions(&self, _required: &[Permission]) -> Vec<Permission> {
        Vec::new()
    }

    fn request_permissions(
        &mut self,
        _permissions: &[Permission],
        _request_code: i32,
    ) -> ScreenRecordResult<()> {
        Err(ScreenRecordError::Unsupported(UNSUPPORTED_MESSAGE.to_string()))
    }

    fn request_capture_grant(&mut self, _request_code: i32) -> ScreenRecordResult<()> {
        log::warn!("Screen capture requested on {}", std::env::consts::OS);
        Err(ScreenRecordError::Unsupported(UNSUPPORTED_MESSAGE.to_string()))
    }
}

/// Recorder that is never busy and refuses to start
#[derive(Default)]
pub struct UnsupportedRecorder {
    listener: Option<Box<dyn RecorderListener>>,
}

impl RecorderEngine for UnsupportedRecorder {
    fn set_output_path(&mut self, _path: &str) {}
    fn set_file_name(&mut self, _name: &str) {}
    fn set_audio_enabled(&mut self, _enabled: bool) {}
    fn set_record_hd_video(&mut self, _enabled: bool) {}
    fn set_audio_bitrate(&mut self, _bitrate: i32) {}
    fn set_audio_sampling_rate(&mut self, _sample_rate: i32) {}
    fn set_video_bitrate(&mut self, _bitrate: i32) {}
    fn set_video_frame_rate(&mut self, _frame_rate: i32) {}
    fn set_notification_small_icon(&mut self, _icon: &[u8]) {}
    fn set_notification_title(&mut self, _title: &str) {}
    fn set_notification_button_text(&mut self, _text: &str) {}
    fn set_notification_description(&mut self, _description: &str) {}

    fn start_screen_recording(&mut self, _grant: &CaptureGrant) -> ScreenRecordResult<()> {
        Err(ScreenRecordError::Unsupported(UNSUPPORTED_MESSAGE.to_string()))
    }

    fn stop_screen_recording(&mut self) {}

    fn is_busy_recording(&self) -> bool {
        false
    }

    fn file_path(&self) -> String {
        String::new()
    }

    fn set_listener(&mut self, listener: Box<dyn RecorderListener>) {
        self.listener = Some(listener);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_platform_refuses_grants() {
        let mut platform = UnsupportedPlatform;
        assert!(platform.missing_permissions(&Permission::required()).is_empty());
        let err = platform.request_capture_grant(333).unwrap_err();
        assert_eq!(err.code(), "ERROR_CODE_UNSUPPORTED");
    }

    #[test]
    fn test_unsupported_recorder_is_idle() {
        let mut recorder = UnsupportedRecorder::default();
        recorder.stop_screen_recording();
        assert!(!recorder.is_busy_recording());
        assert!(recorder.file_path().is_empty());
    }
}
