use crate::bridge::ScreenRecordingState;
use crate::errors::ErrorPayload;
use crate::permissions::PermissionInfo;
use tauri::{command, State};

/// Report the status of every permission the recorder requires
#[command]
pub async fn check_recording_permissions(
    state: State<'_, ScreenRecordingState>,
) -> Result<Vec<PermissionInfo>, ErrorPayload> {
    log::debug!("Checking recording permissions");
    state.permission_report().await.map_err(ErrorPayload::from)
}
