//! Shared coordinator for the Tauri side
//!
//! Commands and the platform event pump run on different tasks, so the
//! coordinator lives behind an async mutex. Coordinator methods may make
//! blocking native calls, so every locked section runs on the blocking
//! pool and never on a runtime worker or the main thread.

use crate::coordinator::{CoordinatorOptions, RecordingSessionCoordinator};
use crate::errors::{ScreenRecordError, ScreenRecordResult};
use crate::permissions::PermissionInfo;
use crate::platform::{Platform, PlatformEvent};
use crate::recorder::{RecorderEngine, RecorderEventSink};
use crate::types::{RecorderNotification, SessionConfig, SessionState};
use std::sync::Arc;
use tauri::{AppHandle, Emitter, Runtime};
use tokio::sync::{mpsc, oneshot, Mutex as AsyncMutex};

pub type DynCoordinator =
    RecordingSessionCoordinator<Box<dyn Platform + Send>, Box<dyn RecorderEngine + Send>>;

pub type StartReceiver = oneshot::Receiver<Result<String, ScreenRecordError>>;

/// Managed state shared by the plugin commands
#[derive(Clone)]
pub struct ScreenRecordingState {
    coordinator: Arc<AsyncMutex<DynCoordinator>>,
}

impl ScreenRecordingState {
    pub fn new(coordinator: DynCoordinator) -> Self {
        Self {
            coordinator: Arc::new(AsyncMutex::new(coordinator)),
        }
    }

    pub fn build(
        platform: Box<dyn Platform + Send>,
        recorder: Box<dyn RecorderEngine + Send>,
        sink: Arc<dyn RecorderEventSink>,
        options: CoordinatorOptions,
    ) -> Self {
        Self::new(RecordingSessionCoordinator::with_options(
            platform, recorder, sink, options,
        ))
    }

    /// Run `f` against the locked coordinator on the blocking pool.
    pub async fn with_coordinator<T, F>(&self, f: F) -> ScreenRecordResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut DynCoordinator) -> T + Send + 'static,
    {
        let coordinator = self.coordinator.clone();
        tokio::task::spawn_blocking(move || {
            let mut coordinator = coordinator.blocking_lock();
            f(&mut coordinator)
        })
        .await
        .map_err(|e| ScreenRecordError::Platform(format!("Coordinator task failed: {}", e)))
    }

    /// Issue a start request; the receiver resolves once the handshake does.
    pub async fn start(&self, config: SessionConfig) -> ScreenRecordResult<StartReceiver> {
        let (tx, rx) = oneshot::channel();
        self.with_coordinator(move |c| c.start_recording(config, Box::new(tx)))
            .await?;
        Ok(rx)
    }

    /// Start and wait for the outcome. A continuation dropped by a newer
    /// request surfaces as `ERROR_CODE_SUPERSEDED`.
    pub async fn start_and_wait(&self, config: SessionConfig) -> ScreenRecordResult<String> {
        let rx = self.start(config).await?;
        match rx.await {
            Ok(outcome) => outcome,
            Err(_) => Err(ScreenRecordError::Superseded),
        }
    }

    pub async fn stop(&self) -> ScreenRecordResult<i32> {
        self.with_coordinator(|c| c.stop_recording()).await
    }

    pub async fn is_recording(&self) -> ScreenRecordResult<bool> {
        self.with_coordinator(|c| c.is_recording()).await
    }

    pub async fn session_state(&self) -> ScreenRecordResult<SessionState> {
        self.with_coordinator(|c| c.state()).await
    }

    pub async fn permission_report(&self) -> ScreenRecordResult<Vec<PermissionInfo>> {
        self.with_coordinator(|c| c.permission_report()).await
    }

    pub async fn apply_options(&self, options: CoordinatorOptions) -> ScreenRecordResult<()> {
        self.reconfigure(options, || Ok(())).await
    }

    /// Replace the coordinator options once `commit` succeeds. Both happen
    /// under the coordinator lock, so no start request can slip in between;
    /// a failed commit leaves the options untouched.
    pub async fn reconfigure<F>(&self, options: CoordinatorOptions, commit: F) -> ScreenRecordResult<()>
    where
        F: FnOnce() -> ScreenRecordResult<()> + Send + 'static,
    {
        self.with_coordinator(move |c| {
            if c.has_pending_request() {
                return Err(ScreenRecordError::RequestPending);
            }
            commit()?;
            c.set_options(options)
        })
        .await?
    }

    pub async fn dispatch(&self, event: PlatformEvent) -> ScreenRecordResult<bool> {
        self.with_coordinator(move |c| c.handle_platform_event(event))
            .await
    }
}

/// Feed platform events into the coordinator until every sender is gone.
pub async fn run_event_pump(
    state: ScreenRecordingState,
    mut events: mpsc::UnboundedReceiver<PlatformEvent>,
) {
    log::debug!("Platform event pump started");
    while let Some(event) = events.recv().await {
        let request_code = event.request_code();
        match state.dispatch(event).await {
            Ok(true) => {}
            Ok(false) => log::debug!("Event with foreign request code {} skipped", request_code),
            Err(e) => {
                log::error!("Dropping platform event: {}", e);
                break;
            }
        }
    }
    log::debug!("Platform event pump stopped");
}

/// Emits recorder notifications as Tauri events
pub struct TauriEventSink<R: Runtime> {
    app: AppHandle<R>,
    event: String,
}

impl<R: Runtime> TauriEventSink<R> {
    pub fn new(app: AppHandle<R>, event: impl Into<String>) -> Self {
        Self {
            app,
            event: event.into(),
        }
    }
}

impl<R: Runtime> RecorderEventSink for TauriEventSink<R> {
    fn emit(&self, notification: RecorderNotification) {
        if let Err(e) = self.app.emit(&self.event, notification) {
            log::error!("Failed to emit {}: {}", self.event, e);
        }
    }
}
