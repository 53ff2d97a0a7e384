//! Tauri commands for screen recording
//!
//! Thin wrappers over [`ScreenRecordingState`]; the handshake itself runs
//! in the coordinator. The three method names of the recording contract
//! (`startRecordScreen`, `stopRecordScreen`, `isRecording`) are the command
//! names as registered.

#![allow(non_snake_case)]

use crate::bridge::ScreenRecordingState;
use crate::errors::ErrorPayload;
use crate::types::{SessionConfig, SessionState};
use tauri::{command, State};

/// Start recording the screen
///
/// Resolves once the permission and capture-grant dialogs have been
/// answered, with the path of the file being written.
#[command]
pub async fn startRecordScreen(
    state: State<'_, ScreenRecordingState>,
    config: Option<SessionConfig>,
) -> Result<String, ErrorPayload> {
    let config = config.unwrap_or_default();
    log::info!("startRecordScreen ({} fields)", config.field_count());
    state.start_and_wait(config).await.map_err(ErrorPayload::from)
}

/// Stop recording. Succeeds with `0` whether or not a recording was running.
#[command]
pub async fn stopRecordScreen(
    state: State<'_, ScreenRecordingState>,
) -> Result<i32, ErrorPayload> {
    state.stop().await.map_err(ErrorPayload::from)
}

#[command]
pub async fn isRecording(state: State<'_, ScreenRecordingState>) -> Result<bool, ErrorPayload> {
    state.is_recording().await.map_err(ErrorPayload::from)
}

#[command]
pub async fn get_session_state(
    state: State<'_, ScreenRecordingState>,
) -> Result<SessionState, ErrorPayload> {
    state.session_state().await.map_err(ErrorPayload::from)
}
