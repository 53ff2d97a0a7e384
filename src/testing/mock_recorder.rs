use crate::errors::{ScreenRecordError, ScreenRecordResult};
use crate::recorder::{RecorderEngine, RecorderListener};
use crate::types::CaptureGrant;
use std::sync::{Arc, Mutex};

pub const DEFAULT_OUTPUT_PATH: &str = "/storage/emulated/0/Movies";
pub const DEFAULT_FILE_NAME: &str = "screen_recording";

/// Values explicitly set on the recorder; `None` means the engine default
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MockSettings {
    pub output_path: Option<String>,
    pub file_name: Option<String>,
    pub audio_enabled: Option<bool>,
    pub hd_video: Option<bool>,
    pub audio_bitrate: Option<i32>,
    pub audio_sampling_rate: Option<i32>,
    pub video_bitrate: Option<i32>,
    pub video_frame_rate: Option<i32>,
    pub notification_icon: Option<Vec<u8>>,
    pub notification_title: Option<String>,
    pub notification_button_text: Option<String>,
    pub notification_description: Option<String>,
}

#[derive(Default)]
struct RecorderState {
    settings: MockSettings,
    busy: bool,
    starts: Vec<CaptureGrant>,
    stops: usize,
    listener: Option<Box<dyn RecorderListener>>,
}

/// In-memory recorder engine
#[derive(Clone, Default)]
pub struct MockRecorder {
    fail_start: bool,
    state: Arc<Mutex<RecorderState>>,
}

impl MockRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_start(mut self) -> Self {
        self.fail_start = true;
        self
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut RecorderState) -> T) -> Option<T> {
        self.state.lock().ok().map(|mut s| f(&mut s))
    }

    pub fn settings(&self) -> MockSettings {
        self.with_state(|s| s.settings.clone()).unwrap_or_default()
    }

    pub fn started(&self) -> bool {
        self.start_count() > 0
    }

    pub fn start_count(&self) -> usize {
        self.with_state(|s| s.starts.len()).unwrap_or(0)
    }

    pub fn last_grant(&self) -> Option<CaptureGrant> {
        self.with_state(|s| s.starts.last().cloned()).flatten()
    }

    pub fn stop_count(&self) -> usize {
        self.with_state(|s| s.stops).unwrap_or(0)
    }

    pub fn has_listener(&self) -> bool {
        self.with_state(|s| s.listener.is_some()).unwrap_or(false)
    }

    /// Simulate the engine finishing a recording
    pub fn fire_complete(&self) {
        self.with_state(|s| {
            s.busy = false;
            if let Some(listener) = &s.listener {
                listener.on_complete();
            }
        });
    }

    /// Simulate an engine failure
    pub fn fire_error(&self, code: i32, reason: &str) {
        self.with_state(|s| {
            s.busy = false;
            if let Some(listener) = &s.listener {
                listener.on_error(code, Some(reason));
            }
        });
    }

    fn set(&mut self, f: impl FnOnce(&mut MockSettings)) {
        self.with_state(|s| f(&mut s.settings));
    }
}

impl RecorderEngine for MockRecorder {
    fn set_output_path(&mut self, path: &str) {
        self.set(|s| s.output_path = Some(path.to_string()));
    }
    fn set_file_name(&mut self, name: &str) {
        self.set(|s| s.file_name = Some(name.to_string()));
    }
    fn set_audio_enabled(&mut self, enabled: bool) {
        self.set(|s| s.audio_enabled = Some(enabled));
    }
    fn set_record_hd_video(&mut self, enabled: bool) {
        self.set(|s| s.hd_video = Some(enabled));
    }
    fn set_audio_bitrate(&mut self, bitrate: i32) {
        self.set(|s| s.audio_bitrate = Some(bitrate));
    }
    fn set_audio_sampling_rate(&mut self, sample_rate: i32) {
        self.set(|s| s.audio_sampling_rate = Some(sample_rate));
    }
    fn set_video_bitrate(&mut self, bitrate: i32) {
        self.set(|s| s.video_bitrate = Some(bitrate));
    }
    fn set_video_frame_rate(&mut self, frame_rate: i32) {
        self.set(|s| s.video_frame_rate = Some(frame_rate));
    }
    fn set_notification_small_icon(&mut self, icon: &[u8]) {
        self.set(|s| s.notification_icon = Some(icon.to_vec()));
    }
    fn set_notification_title(&mut self, title: &str) {
        self.set(|s| s.notification_title = Some(title.to_string()));
    }
    fn set_notification_button_text(&mut self, text: &str) {
        self.set(|s| s.notification_button_text = Some(text.to_string()));
    }
    fn set_notification_description(&mut self, description: &str) {
        self.set(|s| s.notification_description = Some(description.to_string()));
    }

    fn start_screen_recording(&mut self, grant: &CaptureGrant) -> ScreenRecordResult<()> {
        if self.fail_start {
            return Err(ScreenRecordError::Platform(
                "encoder initialisation failed".to_string(),
            ));
        }
        self.with_state(|s| {
            s.busy = true;
            s.starts.push(grant.clone());
        });
        Ok(())
    }

    fn stop_screen_recording(&mut self) {
        self.with_state(|s| {
            s.busy = false;
            s.stops += 1;
        });
    }

    fn is_busy_recording(&self) -> bool {
        self.with_state(|s| s.busy).unwrap_or(false)
    }

    fn file_path(&self) -> String {
        let settings = self.settings();
        format!(
            "{}/{}.mp4",
            settings.output_path.as_deref().unwrap_or(DEFAULT_OUTPUT_PATH),
            settings.file_name.as_deref().unwrap_or(DEFAULT_FILE_NAME)
        )
    }

    fn set_listener(&mut self, listener: Box<dyn RecorderListener>) {
        self.with_state(|s| s.listener = Some(listener));
    }
}
