//! Recording engine seam
//!
//! The engine does the actual capture, encoding and file output. This crate
//! only configures it, starts and stops it, and relays its listener
//! callbacks to the caller.

use crate::errors::ScreenRecordResult;
use crate::types::{CaptureGrant, RecorderNotification, SessionConfig};
use std::sync::Arc;

/// Callbacks raised by the engine at any time, independent of requests
pub trait RecorderListener: Send + Sync {
    fn on_complete(&self);
    fn on_error(&self, error_code: i32, reason: Option<&str>);
}

/// A screen recording engine.
///
/// Setters keep their value across sessions until overwritten.
pub trait RecorderEngine {
    fn set_output_path(&mut self, path: &str);
    fn set_file_name(&mut self, name: &str);
    fn set_audio_enabled(&mut self, enabled: bool);
    fn set_record_hd_video(&mut self, enabled: bool);
    fn set_audio_bitrate(&mut self, bitrate: i32);
    fn set_audio_sampling_rate(&mut self, sample_rate: i32);
    fn set_video_bitrate(&mut self, bitrate: i32);
    fn set_video_frame_rate(&mut self, frame_rate: i32);
    fn set_notification_small_icon(&mut self, icon: &[u8]);
    fn set_notification_title(&mut self, title: &str);
    fn set_notification_button_text(&mut self, text: &str);
    fn set_notification_description(&mut self, description: &str);

    fn start_screen_recording(&mut self, grant: &CaptureGrant) -> ScreenRecordResult<()>;
    fn stop_screen_recording(&mut self);
    fn is_busy_recording(&self) -> bool;
    /// Path of the file the current (or last) recording writes to
    fn file_path(&self) -> String;

    fn set_listener(&mut self, listener: Box<dyn RecorderListener>);
}

impl<T: RecorderEngine + ?Sized> RecorderEngine for Box<T> {
    fn set_output_path(&mut self, path: &str) {
        (**self).set_output_path(path)
    }
    fn set_file_name(&mut self, name: &str) {
        (**self).set_file_name(name)
    }
    fn set_audio_enabled(&mut self, enabled: bool) {
        (**self).set_audio_enabled(enabled)
    }
    fn set_record_hd_video(&mut self, enabled: bool) {
        (**self).set_record_hd_video(enabled)
    }
    fn set_audio_bitrate(&mut self, bitrate: i32) {
        (**self).set_audio_bitrate(bitrate)
    }
    fn set_audio_sampling_rate(&mut self, sample_rate: i32) {
        (**self).set_audio_sampling_rate(sample_rate)
    }
    fn set_video_bitrate(&mut self, bitrate: i32) {
        (**self).set_video_bitrate(bitrate)
    }
    fn set_video_frame_rate(&mut self, frame_rate: i32) {
        (**self).set_video_frame_rate(frame_rate)
    }
    fn set_notification_small_icon(&mut self, icon: &[u8]) {
        (**self).set_notification_small_icon(icon)
    }
    fn set_notification_title(&mut self, title: &str) {
        (**self).set_notification_title(title)
    }
    fn set_notification_button_text(&mut self, text: &str) {
        (**self).set_notification_button_text(text)
    }
    fn set_notification_description(&mut self, description: &str) {
        (**self).set_notification_description(description)
    }
    fn start_screen_recording(&mut self, grant: &CaptureGrant) -> ScreenRecordResult<()> {
        (**self).start_screen_recording(grant)
    }
    fn stop_screen_recording(&mut self) {
        (**self).stop_screen_recording()
    }
    fn is_busy_recording(&self) -> bool {
        (**self).is_busy_recording()
    }
    fn file_path(&self) -> String {
        (**self).file_path()
    }
    fn set_listener(&mut self, listener: Box<dyn RecorderListener>) {
        (**self).set_listener(listener)
    }
}

/// Apply every present field of `config` to the recorder.
pub fn apply_session_config<E: RecorderEngine + ?Sized>(recorder: &mut E, config: &SessionConfig) {
    if let Some(path) = &config.output_path {
        recorder.set_output_path(path);
    }
    if let Some(name) = &config.file_name {
        recorder.set_file_name(name);
    }
    if let Some(enabled) = config.is_audio_enabled {
        recorder.set_audio_enabled(enabled);
    }
    if let Some(enabled) = config.is_record_hd_video {
        recorder.set_record_hd_video(enabled);
    }
    if let Some(bitrate) = config.audio_bitrate {
        recorder.set_audio_bitrate(bitrate);
    }
    if let Some(rate) = config.audio_sampling_rate {
        recorder.set_audio_sampling_rate(rate);
    }
    if let Some(bitrate) = config.video_bitrate {
        recorder.set_video_bitrate(bitrate);
    }
    if let Some(rate) = config.video_frame_rate {
        recorder.set_video_frame_rate(rate);
    }
    if let Some(icon) = &config.notification_icon {
        recorder.set_notification_small_icon(icon);
    }
    if let Some(title) = &config.notification_title {
        recorder.set_notification_title(title);
    }
    if let Some(text) = &config.notification_button_text {
        recorder.set_notification_button_text(text);
    }
    if let Some(description) = &config.notification_description {
        recorder.set_notification_description(description);
    }
}

/// Receiver of `onRecorderListener` push notifications
pub trait RecorderEventSink: Send + Sync {
    fn emit(&self, notification: RecorderNotification);
}

impl RecorderEventSink for tokio::sync::mpsc::UnboundedSender<RecorderNotification> {
    fn emit(&self, notification: RecorderNotification) {
        if self.send(notification).is_err() {
            log::debug!("Recorder notification dropped, receiver closed");
        }
    }
}

/// Listener installed on the engine that turns its callbacks into push
/// notifications.
pub struct EventForwarder {
    sink: Arc<dyn RecorderEventSink>,
}

impl EventForwarder {
    pub fn new(sink: Arc<dyn RecorderEventSink>) -> Self {
        Self { sink }
    }
}

impl RecorderListener for EventForwarder {
    fn on_complete(&self) {
        log::info!("Screen recording finished");
        self.sink.emit(RecorderNotification::completed());
    }

    fn on_error(&self, error_code: i32, reason: Option<&str>) {
        log::warn!(
            "Screen recorder error {}: {}",
            error_code,
            reason.unwrap_or("no reason given")
        );
        self.sink.emit(RecorderNotification::failed(error_code));
    }
}
