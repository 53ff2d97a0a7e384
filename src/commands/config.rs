use crate::bridge::ScreenRecordingState;
use crate::config::{ScreenRecConfig, CONFIG_FILE_NAME};
use crate::errors::{ErrorPayload, ScreenRecordError};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tauri::{command, AppHandle, Manager, Runtime, State};

lazy_static::lazy_static! {
    static ref GLOBAL_CONFIG: Arc<RwLock<ScreenRecConfig>> = Arc::new(RwLock::new(ScreenRecConfig::default()));
}

/// Snapshot of the process-wide configuration
pub fn current_config() -> Result<ScreenRecConfig, ScreenRecordError> {
    let config = GLOBAL_CONFIG.read()?;
    Ok(config.clone())
}

/// Install the configuration read at startup.
pub fn install_config(config: ScreenRecConfig) -> Result<(), ScreenRecordError> {
    let mut current = GLOBAL_CONFIG.write()?;
    *current = config;
    Ok(())
}

/// Config file location inside the app's config directory, or the working
/// directory when the host cannot resolve one.
pub fn config_path<R: Runtime>(app: &AppHandle<R>) -> PathBuf {
    match app.path().app_config_dir() {
        Ok(dir) => dir.join(CONFIG_FILE_NAME),
        Err(e) => {
            log::warn!("No app config directory ({}), using working directory", e);
            ScreenRecConfig::default_path()
        }
    }
}

/// Reject configurations that cannot be applied to the running plugin.
/// The recorder event name is bound at startup.
fn check_replacement(
    current: &ScreenRecConfig,
    new_config: &ScreenRecConfig,
) -> Result<(), ScreenRecordError> {
    new_config.validate().map_err(ScreenRecordError::Config)?;
    if new_config.channel.recorder_event != current.channel.recorder_event {
        return Err(ScreenRecordError::Config(format!(
            "Recorder event name is fixed at startup (currently {:?})",
            current.channel.recorder_event
        )));
    }
    Ok(())
}

/// Validate, persist, and then apply a configuration.
///
/// The file is written under the coordinator lock before the new options
/// take effect. On any failure the running coordinator and the stored
/// configuration keep their previous values.
pub async fn replace_config(
    state: &ScreenRecordingState,
    new_config: ScreenRecConfig,
    path: &Path,
) -> Result<(), ScreenRecordError> {
    let current = current_config()?;
    check_replacement(&current, &new_config)?;
    let options = new_config.coordinator_options()?;

    let to_save = new_config.clone();
    let path = path.to_path_buf();
    state
        .reconfigure(options, move || to_save.save_to_file(&path))
        .await?;

    install_config(new_config)
}

/// Get the current configuration
#[command]
pub async fn get_config() -> Result<ScreenRecConfig, ErrorPayload> {
    current_config().map_err(ErrorPayload::from)
}

/// Update configuration. Refused while a start request is pending.
#[command]
pub async fn update_config<R: Runtime>(
    app: AppHandle<R>,
    state: State<'_, ScreenRecordingState>,
    new_config: ScreenRecConfig,
) -> Result<(), ErrorPayload> {
    replace_config(&state, new_config, &config_path(&app))
        .await
        .map_err(ErrorPayload::from)
}

/// Reset configuration to defaults. The running event name is kept.
#[command]
pub async fn reset_config<R: Runtime>(
    app: AppHandle<R>,
    state: State<'_, ScreenRecordingState>,
) -> Result<ScreenRecConfig, ErrorPayload> {
    let mut default_config = ScreenRecConfig::default();
    default_config.channel = current_config().map_err(ErrorPayload::from)?.channel;
    replace_config(&state, default_config.clone(), &config_path(&app))
        .await
        .map_err(ErrorPayload::from)?;
    Ok(default_config)
}
