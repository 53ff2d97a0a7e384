//! screenrec: Android screen recording for Tauri applications
//!
//! Bridges the platform's media-projection flow and a native recorder
//! engine to the application's plugin channel. A start request walks
//! through the runtime permission dialog and the screen capture dialog
//! before the recorder is started; completion and error callbacks from the
//! recorder are pushed to the application as `onRecorderListener` events.
//!
//! # Usage
//! Add this to your `Cargo.toml`:
//! ```toml
//! [dependencies]
//! screenrec = "0.1"
//! tauri = "2.0"
//! ```
//!
//! Then in your Tauri app:
//! ```rust,ignore
//! fn main() {
//!     tauri::Builder::default()
//!         .plugin(screenrec::init())
//!         .run(tauri::generate_context!())
//!         .expect("error while running tauri application");
//! }
//! ```
//!
//! On hosts without media projection every start request fails with
//! `ERROR_CODE_UNSUPPORTED`.
pub mod bridge;
pub mod channel;
pub mod commands;
pub mod config;
pub mod coordinator;
pub mod errors;
pub mod permissions;
pub mod platform;
pub mod recorder;
pub mod types;

// Testing utilities - scriptable platform and recorder
pub mod testing;

// Re-exports for convenience
pub use bridge::ScreenRecordingState;
pub use coordinator::{CoordinatorOptions, PendingPolicy, RecordingSessionCoordinator, StartResponder};
pub use errors::{ErrorPayload, ScreenRecordError};
pub use platform::{Platform, PlatformEvent};
pub use recorder::{RecorderEngine, RecorderEventSink, RecorderListener};
pub use types::{RecorderNotification, SessionConfig, SessionState};

use bridge::TauriEventSink;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tauri::{
    plugin::{Builder, PluginApi, TauriPlugin},
    AppHandle, Manager, Runtime,
};

/// Names of the commands registered by [`init`]. The recording commands
/// carry the method names of the recording contract.
pub const COMMANDS: &[&str] = &[
    "startRecordScreen",
    "stopRecordScreen",
    "isRecording",
    "get_session_state",
    "check_recording_permissions",
    "get_config",
    "update_config",
    "reset_config",
];

/// Initialize the screenrec plugin with all commands
pub fn init<R: Runtime>() -> TauriPlugin<R> {
    Builder::new("screenrec")
        .invoke_handler(tauri::generate_handler![
            // Recording commands
            commands::recording::startRecordScreen,
            commands::recording::stopRecordScreen,
            commands::recording::isRecording,
            commands::recording::get_session_state,
            // Permission commands
            commands::permissions::check_recording_permissions,
            // Configuration commands
            commands::config::get_config,
            commands::config::update_config,
            commands::config::reset_config,
        ])
        .setup(|app, api| {
            let path = commands::config::config_path(app);
            let config = config::ScreenRecConfig::load_or_default(&path);
            config.validate()?;
            init_logging_with_level(config.log_level()?);
            commands::config::install_config(config.clone())?;

            let options = config.coordinator_options()?;
            let sink: Arc<dyn RecorderEventSink> = Arc::new(TauriEventSink::new(
                app.clone(),
                config.channel.recorder_event.clone(),
            ));
            let state = build_state(app, api, sink, options)?;
            app.manage(state);
            log::info!("screenrec plugin ready ({}, config {:?})", std::env::consts::OS, path);
            Ok(())
        })
        .build()
}

#[cfg(target_os = "android")]
fn build_state<R: Runtime, C: DeserializeOwned>(
    _app: &AppHandle<R>,
    api: PluginApi<R, C>,
    sink: Arc<dyn RecorderEventSink>,
    options: CoordinatorOptions,
) -> Result<ScreenRecordingState, Box<dyn std::error::Error>> {
    use platform::{AndroidPlatform, AndroidRecorder};

    let handle = api.register_android_plugin("app.screenrec", "ScreenRecordingPlugin")?;
    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
    let state = ScreenRecordingState::build(
        Box::new(AndroidPlatform::new(handle.clone(), tx)),
        Box::new(AndroidRecorder::new(handle)),
        sink,
        options,
    );
    tauri::async_runtime::spawn(bridge::run_event_pump(state.clone(), rx));
    Ok(state)
}

#[cfg(not(target_os = "android"))]
fn build_state<R: Runtime, C: DeserializeOwned>(
    _app: &AppHandle<R>,
    _api: PluginApi<R, C>,
    sink: Arc<dyn RecorderEventSink>,
    options: CoordinatorOptions,
) -> Result<ScreenRecordingState, Box<dyn std::error::Error>> {
    use platform::{UnsupportedPlatform, UnsupportedRecorder};

    Ok(ScreenRecordingState::build(
        Box::new(UnsupportedPlatform),
        Box::new(UnsupportedRecorder::default()),
        sink,
        options,
    ))
}

/// Initialize logging for the plugin
pub fn init_logging() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "screenrec=info");
    }
    let _ = env_logger::try_init();
}

fn logging_builder(level: log::LevelFilter) -> env_logger::Builder {
    let mut builder = env_logger::Builder::new();
    builder.filter_module("screenrec", level);
    builder
}

/// Initialize logging at an explicit level, e.g. from the `[logging]`
/// section of the config file. `RUST_LOG` still wins when set.
pub fn init_logging_with_level(level: log::LevelFilter) {
    let _ = logging_builder(level).parse_default_env().try_init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
