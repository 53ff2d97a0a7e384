//! Android binding through the plugin's native half.
//!
//! Permission and capture dialogs are blocking native calls, so they run on
//! the blocking pool and report back through the platform event channel.
//! Recorder settings are accumulated here and shipped with the start call;
//! the native side applies only the fields present.
//!
//! # Native contract
//!
//! The Kotlin class `app.screenrec.ScreenRecordingPlugin` answers these
//! commands (JSON payloads, camelCase keys):
//!
//! | Command | Arguments | Resolves with |
//! |---|---|---|
//! | `checkPermissions` | `{permissions: [name], requestCode}` | `{states: {name: "granted" \| "denied"}}` |
//! | `requestPermissions` | `{permissions: [name], requestCode}` | `{grantResults: [int]}`, positional, `0` granted |
//! | `requestCaptureGrant` | `{requestCode}` | `{resultCode, token?}`, `-1` accepted |
//! | `startScreenRecording` | `{token, resultCode, settings}` | anything |
//! | `stopScreenRecording` | none | anything |
//! | `isBusyRecording` | none | `{busy}` |
//! | `filePath` | none | `{path?}` |
//! | `setRecorderListener` | `{channel}` | anything |
//!
//! `settings` holds the recorder fields that were set, named as in the
//! start configuration (`outputPath`, `fileName`, `audioEnabled`,
//! `recordHDVideo`, `audioBitrate`, `audioSamplingRate`, `videoBitrate`,
//! `videoFrameRate`, `notificationSmallIcon`, `notificationTitle`,
//! `notificationButtonText`, `notificationDescription`). The listener
//! channel receives `{event: "complete"}` or
//! `{event: "error", code, reason?}`. A rejected dialog call is reported as
//! a platform failure, never as a user decision.

use crate::errors::{ScreenRecordError, ScreenRecordResult};
use crate::permissions::{Permission, PermissionStatus};
use crate::platform::{Platform, PlatformEvent};
use crate::recorder::{RecorderEngine, RecorderListener};
use crate::types::{CaptureGrant, CaptureToken};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tauri::ipc::{Channel, InvokeResponseBody};
use tauri::plugin::PluginHandle;
use tauri::Runtime;
use tokio::sync::mpsc::UnboundedSender;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PermissionsArgs {
    permissions: Vec<&'static str>,
    request_code: i32,
}

#[derive(Deserialize)]
struct PermissionStates {
    /// Android permission name -> "granted" / "denied"
    states: HashMap<String, String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PermissionsResponse {
    grant_results: Vec<i32>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CaptureArgs {
    request_code: i32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptureResponse {
    result_code: i32,
    token: Option<String>,
}

pub struct AndroidPlatform<R: Runtime> {
    handle: PluginHandle<R>,
    events: UnboundedSender<PlatformEvent>,
}

impl<R: Runtime> AndroidPlatform<R> {
    pub fn new(handle: PluginHandle<R>, events: UnboundedSender<PlatformEvent>) -> Self {
        Self { handle, events }
    }
}

impl<R: Runtime> Platform for AndroidPlatform<R> {
    fn missing_permissions(&self, required: &[Permission]) -> Vec<Permission> {
        let args = PermissionsArgs {
            permissions: required.iter().map(|p| p.as_android_str()).collect(),
            request_code: 0,
        };
        match self
            .handle
            .run_mobile_plugin::<PermissionStates>("checkPermissions", args)
        {
            Ok(response) => required
                .iter()
                .filter(|p| {
                    response.states.get(p.as_android_str()).map(String::as_str) != Some("granted")
                })
                .copied()
                .collect(),
            Err(e) => {
                log::error!("checkPermissions failed, treating all as missing: {}", e);
                required.to_vec()
            }
        }
    }

    fn request_permissions(
        &mut self,
        permissions: &[Permission],
        request_code: i32,
    ) -> ScreenRecordResult<()> {
        let handle = self.handle.clone();
        let events = self.events.clone();
        let permissions = permissions.to_vec();
        tauri::async_runtime::spawn_blocking(move || {
            let args = PermissionsArgs {
                permissions: permissions.iter().map(|p| p.as_android_str()).collect(),
                request_code,
            };
            let event = match handle.run_mobile_plugin::<PermissionsResponse>("requestPermissions", args) {
                Ok(response) => PlatformEvent::PermissionsResult {
                    request_code,
                    permissions,
                    results: response
                        .grant_results
                        .into_iter()
                        .map(PermissionStatus::from_grant_code)
                        .collect(),
                },
                Err(e) => {
                    log::error!("requestPermissions failed: {}", e);
                    PlatformEvent::RequestFailed {
                        request_code,
                        message: format!("requestPermissions: {}", e),
                    }
                }
            };
            let _ = events.send(event);
        });
        Ok(())
    }

    fn request_capture_grant(&mut self, request_code: i32) -> ScreenRecordResult<()> {
        let handle = self.handle.clone();
        let events = self.events.clone();
        tauri::async_runtime::spawn_blocking(move || {
            let event = match handle
                .run_mobile_plugin::<CaptureResponse>("requestCaptureGrant", CaptureArgs { request_code })
            {
                Ok(response) => PlatformEvent::ActivityResult {
                    request_code,
                    result_code: response.result_code,
                    token: response.token.map(CaptureToken::new),
                },
                Err(e) => {
                    log::error!("requestCaptureGrant failed: {}", e);
                    PlatformEvent::RequestFailed {
                        request_code,
                        message: format!("requestCaptureGrant: {}", e),
                    }
                }
            };
            let _ = events.send(event);
        });
        Ok(())
    }
}

/// Recorder settings shipped with `startScreenRecording`
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct RecorderSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    output_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    audio_enabled: Option<bool>,
    #[serde(rename = "recordHDVideo", skip_serializing_if = "Option::is_none")]
    record_hd_video: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    audio_bitrate: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    audio_sampling_rate: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    video_bitrate: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    video_frame_rate: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    notification_small_icon: Option<Vec<u8>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    notification_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    notification_button_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    notification_description: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StartArgs<'a> {
    token: &'a str,
    result_code: i32,
    settings: &'a RecorderSettings,
}

#[derive(Deserialize)]
struct BusyResponse {
    busy: bool,
}

#[derive(Deserialize)]
struct FilePathResponse {
    path: Option<String>,
}

#[derive(Serialize)]
struct ListenerArgs {
    channel: Channel,
}

#[derive(Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
enum ListenerMessage {
    Complete,
    Error { code: i32, reason: Option<String> },
}

type SharedListener = Arc<Mutex<Option<Box<dyn RecorderListener>>>>;

pub struct AndroidRecorder<R: Runtime> {
    handle: PluginHandle<R>,
    settings: RecorderSettings,
    listener: SharedListener,
}

impl<R: Runtime> AndroidRecorder<R> {
    pub fn new(handle: PluginHandle<R>) -> Self {
        Self {
            handle,
            settings: RecorderSettings::default(),
            listener: Arc::new(Mutex::new(None)),
        }
    }
}

fn deliver(listener: &SharedListener, body: InvokeResponseBody) {
    let message = match body {
        InvokeResponseBody::Json(json) => serde_json::from_str::<ListenerMessage>(&json),
        InvokeResponseBody::Raw(bytes) => serde_json::from_slice::<ListenerMessage>(&bytes),
    };
    let message = match message {
        Ok(message) => message,
        Err(e) => {
            log::error!("Undecodable recorder callback: {}", e);
            return;
        }
    };
    let guard = match listener.lock() {
        Ok(guard) => guard,
        Err(_) => return,
    };
    if let Some(listener) = guard.as_ref() {
        match message {
            ListenerMessage::Complete => listener.on_complete(),
            ListenerMessage::Error { code, reason } => listener.on_error(code, reason.as_deref()),
        }
    }
}

impl<R: Runtime> RecorderEngine for AndroidRecorder<R> {
    fn set_output_path(&mut self, path: &str) {
        self.settings.output_path = Some(path.to_string());
    }
    fn set_file_name(&mut self, name: &str) {
        self.settings.file_name = Some(name.to_string());
    }
    fn set_audio_enabled(&mut self, enabled: bool) {
        self.settings.audio_enabled = Some(enabled);
    }
    fn set_record_hd_video(&mut self, enabled: bool) {
        self.settings.record_hd_video = Some(enabled);
    }
    fn set_audio_bitrate(&mut self, bitrate: i32) {
        self.settings.audio_bitrate = Some(bitrate);
    }
    fn set_audio_sampling_rate(&mut self, sample_rate: i32) {
        self.settings.audio_sampling_rate = Some(sample_rate);
    }
    fn set_video_bitrate(&mut self, bitrate: i32) {
        self.settings.video_bitrate = Some(bitrate);
    }
    fn set_video_frame_rate(&mut self, frame_rate: i32) {
        self.settings.video_frame_rate = Some(frame_rate);
    }
    fn set_notification_small_icon(&mut self, icon: &[u8]) {
        self.settings.notification_small_icon = Some(icon.to_vec());
    }
    fn set_notification_title(&mut self, title: &str) {
        self.settings.notification_title = Some(title.to_string());
    }
    fn set_notification_button_text(&mut self, text: &str) {
        self.settings.notification_button_text = Some(text.to_string());
    }
    fn set_notification_description(&mut self, description: &str) {
        self.settings.notification_description = Some(description.to_string());
    }

    fn start_screen_recording(&mut self, grant: &CaptureGrant) -> ScreenRecordResult<()> {
        let args = StartArgs {
            token: grant.token.as_str(),
            result_code: grant.result_code,
            settings: &self.settings,
        };
        self.handle
            .run_mobile_plugin::<serde_json::Value>("startScreenRecording", args)
            .map(|_| ())
            .map_err(|e| ScreenRecordError::Platform(format!("startScreenRecording: {}", e)))
    }

    fn stop_screen_recording(&mut self) {
        if let Err(e) = self.handle.run_mobile_plugin::<serde_json::Value>("stopScreenRecording", ()) {
            log::error!("stopScreenRecording failed: {}", e);
        }
    }

    fn is_busy_recording(&self) -> bool {
        match self.handle.run_mobile_plugin::<BusyResponse>("isBusyRecording", ()) {
            Ok(response) => response.busy,
            Err(e) => {
                log::error!("isBusyRecording failed: {}", e);
                false
            }
        }
    }

    fn file_path(&self) -> String {
        match self.handle.run_mobile_plugin::<FilePathResponse>("filePath", ()) {
            Ok(response) => response.path.unwrap_or_default(),
            Err(e) => {
                log::error!("filePath failed: {}", e);
                String::new()
            }
        }
    }

    fn set_listener(&mut self, listener: Box<dyn RecorderListener>) {
        if let Ok(mut slot) = self.listener.lock() {
            *slot = Some(listener);
        }
        let shared = self.listener.clone();
        let channel = Channel::new(move |body| {
            deliver(&shared, body);
            Ok(())
        });
        if let Err(e) = self
            .handle
            .run_mobile_plugin::<serde_json::Value>("setRecorderListener", ListenerArgs { channel })
        {
            log::error!("setRecorderListener failed: {}", e);
        }
    }
}
