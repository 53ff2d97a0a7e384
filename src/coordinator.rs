//! Recording session coordinator
//!
//! Drives the two-step handshake that precedes every recording:
//!
//! ```text
//! Idle --start(missing permissions)--> AwaitingPermission --granted--> AwaitingCaptureGrant
//! Idle --start(permissions held)-----> AwaitingCaptureGrant --granted--> Recording
//! AwaitingPermission --denied--> Idle        AwaitingCaptureGrant --cancelled--> Idle
//! Recording --stop--> Idle
//! ```
//!
//! The coordinator holds at most one pending start request. It never keeps
//! its own copy of the recording flag; `Recording` is read from the engine.

use crate::errors::ScreenRecordError;
use crate::permissions::{denied_permissions, permission_report, Permission, PermissionInfo, PermissionStatus};
use crate::platform::{Platform, PlatformEvent};
use crate::recorder::{apply_session_config, EventForwarder, RecorderEngine, RecorderEventSink};
use crate::types::{
    CaptureGrant, CaptureToken, SessionConfig, SessionState, PERMISSIONS_REQUEST_CODE, RESULT_OK,
    SCREEN_RECORD_REQUEST_CODE,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Continuation of a `startRecordScreen` call. Exactly one of the two
/// methods is called, at most once.
pub trait StartResponder: Send {
    fn success(self: Box<Self>, output_path: String);
    fn error(self: Box<Self>, error: ScreenRecordError);
}

impl StartResponder for tokio::sync::oneshot::Sender<Result<String, ScreenRecordError>> {
    fn success(self: Box<Self>, output_path: String) {
        if (*self).send(Ok(output_path)).is_err() {
            log::debug!("Start result dropped, caller went away");
        }
    }

    fn error(self: Box<Self>, error: ScreenRecordError) {
        if (*self).send(Err(error)).is_err() {
            log::debug!("Start error dropped, caller went away");
        }
    }
}

/// What happens to a start request arriving while another is pending
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingPolicy {
    /// Drop the earlier continuation without resolving it
    Replace,
    /// Answer the new request with `ERROR_CODE_REQUEST_PENDING`
    Reject,
}

impl Default for PendingPolicy {
    fn default() -> Self {
        PendingPolicy::Replace
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinatorOptions {
    pub permission_request_code: i32,
    pub capture_request_code: i32,
    pub pending_policy: PendingPolicy,
    pub required_permissions: Vec<Permission>,
}

impl Default for CoordinatorOptions {
    fn default() -> Self {
        Self {
            permission_request_code: PERMISSIONS_REQUEST_CODE,
            capture_request_code: SCREEN_RECORD_REQUEST_CODE,
            pending_policy: PendingPolicy::default(),
            required_permissions: Permission::required(),
        }
    }
}

/// The single in-flight start request
struct PendingRequest {
    id: Uuid,
    config: SessionConfig,
    responder: Box<dyn StartResponder>,
    created_at: DateTime<Utc>,
}

impl PendingRequest {
    fn new(config: SessionConfig, responder: Box<dyn StartResponder>) -> Self {
        Self {
            id: Uuid::new_v4(),
            config,
            responder,
            created_at: Utc::now(),
        }
    }

    fn age_ms(&self) -> i64 {
        (Utc::now() - self.created_at).num_milliseconds()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    AwaitingPermission,
    AwaitingCaptureGrant,
}

pub struct RecordingSessionCoordinator<P, E> {
    platform: P,
    recorder: E,
    options: CoordinatorOptions,
    phase: Phase,
    pending: Option<PendingRequest>,
    /// Permissions asked for in the outstanding dialog, in request order
    requested: Vec<Permission>,
}

impl<P: Platform, E: RecorderEngine> RecordingSessionCoordinator<P, E> {
    /// Build a coordinator and subscribe `sink` to the recorder's listener.
    pub fn new(platform: P, recorder: E, sink: Arc<dyn RecorderEventSink>) -> Self {
        Self::with_options(platform, recorder, sink, CoordinatorOptions::default())
    }

    pub fn with_options(
        platform: P,
        mut recorder: E,
        sink: Arc<dyn RecorderEventSink>,
        options: CoordinatorOptions,
    ) -> Self {
        recorder.set_listener(Box::new(EventForwarder::new(sink)));
        Self {
            platform,
            recorder,
            options,
            phase: Phase::Idle,
            pending: None,
            requested: Vec::new(),
        }
    }

    pub fn options(&self) -> &CoordinatorOptions {
        &self.options
    }

    /// Replace the options. Refused while a request is pending, since the
    /// outstanding event would carry the old request code.
    pub fn set_options(&mut self, options: CoordinatorOptions) -> Result<(), ScreenRecordError> {
        if self.pending.is_some() {
            return Err(ScreenRecordError::RequestPending);
        }
        self.options = options;
        Ok(())
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn recorder(&self) -> &E {
        &self.recorder
    }

    pub fn state(&self) -> SessionState {
        match self.phase {
            Phase::AwaitingPermission => SessionState::AwaitingPermission,
            Phase::AwaitingCaptureGrant => SessionState::AwaitingCaptureGrant,
            Phase::Idle if self.recorder.is_busy_recording() => SessionState::Recording,
            Phase::Idle => SessionState::Idle,
        }
    }

    pub fn has_pending_request(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending_request_id(&self) -> Option<Uuid> {
        self.pending.as_ref().map(|p| p.id)
    }

    /// Begin a recording session. Returns as soon as the first platform
    /// request has been issued; `responder` is resolved by a later event.
    pub fn start_recording(&mut self, config: SessionConfig, responder: Box<dyn StartResponder>) {
        if let Some(previous) = self.pending.take() {
            match self.options.pending_policy {
                PendingPolicy::Reject => {
                    log::warn!(
                        "Rejecting start request, request {} still pending",
                        previous.id
                    );
                    self.pending = Some(previous);
                    responder.error(ScreenRecordError::RequestPending);
                    return;
                }
                PendingPolicy::Replace => {
                    // The dropped continuation is never resolved.
                    log::warn!(
                        "Start request {} replaced after {}ms without a result",
                        previous.id,
                        previous.age_ms()
                    );
                }
            }
        }

        let request = PendingRequest::new(config, responder);
        log::info!(
            "Start recording request {} ({} config fields)",
            request.id,
            request.config.field_count()
        );
        self.pending = Some(request);

        let missing = self
            .platform
            .missing_permissions(&self.options.required_permissions);
        if missing.is_empty() {
            self.request_capture_grant();
        } else {
            log::info!("Missing permissions: {:?}", missing);
            self.request_permissions();
        }
    }

    fn request_permissions(&mut self) {
        self.requested = self.options.required_permissions.clone();
        self.phase = Phase::AwaitingPermission;
        if let Err(e) = self
            .platform
            .request_permissions(&self.requested, self.options.permission_request_code)
        {
            log::error!("Failed to request permissions: {}", e);
            self.fail_pending(e);
        }
    }

    fn request_capture_grant(&mut self) {
        self.phase = Phase::AwaitingCaptureGrant;
        if let Err(e) = self
            .platform
            .request_capture_grant(self.options.capture_request_code)
        {
            log::error!("Failed to request screen capture: {}", e);
            self.fail_pending(e);
        }
    }

    fn fail_pending(&mut self, error: ScreenRecordError) {
        self.phase = Phase::Idle;
        self.requested.clear();
        if let Some(request) = self.pending.take() {
            log::info!("Start request {} failed: {}", request.id, error.code());
            request.responder.error(error);
        }
    }

    /// Feed a platform result event. Returns whether the event's request
    /// code belongs to this coordinator.
    pub fn handle_platform_event(&mut self, event: PlatformEvent) -> bool {
        match event {
            PlatformEvent::PermissionsResult {
                request_code,
                permissions,
                results,
            } => self.on_request_permissions_result(request_code, &permissions, &results),
            PlatformEvent::ActivityResult {
                request_code,
                result_code,
                token,
            } => self.on_activity_result(request_code, result_code, token),
            PlatformEvent::RequestFailed {
                request_code,
                message,
            } => self.on_request_failed(request_code, message),
        }
    }

    /// The platform could not carry out one of our requests. Resolves the
    /// pending request with `ERROR_CODE_PLATFORM` when the code matches the
    /// dialog currently awaited.
    pub fn on_request_failed(&mut self, request_code: i32, message: String) -> bool {
        if request_code != self.options.permission_request_code
            && request_code != self.options.capture_request_code
        {
            return false;
        }
        let awaited = match self.phase {
            Phase::AwaitingPermission => Some(self.options.permission_request_code),
            Phase::AwaitingCaptureGrant => Some(self.options.capture_request_code),
            Phase::Idle => None,
        };
        if awaited != Some(request_code) || self.pending.is_none() {
            log::debug!("Ignoring stale failure for request code {}", request_code);
            return true;
        }
        log::error!("Platform request {} failed: {}", request_code, message);
        self.fail_pending(ScreenRecordError::Platform(message));
        true
    }

    /// Outcome of the runtime permission dialog. `results` is positional
    /// against `permissions`; when `permissions` is empty the coordinator's
    /// own request order is used.
    pub fn on_request_permissions_result(
        &mut self,
        request_code: i32,
        permissions: &[Permission],
        results: &[PermissionStatus],
    ) -> bool {
        if request_code != self.options.permission_request_code {
            return false;
        }
        if self.phase != Phase::AwaitingPermission || self.pending.is_none() {
            log::debug!("Ignoring stale permission result");
            return true;
        }

        let requested = if permissions.is_empty() {
            std::mem::take(&mut self.requested)
        } else {
            self.requested.clear();
            permissions.to_vec()
        };

        let denied = denied_permissions(&requested, results);
        if denied.is_empty() {
            log::info!("Permissions granted");
            self.request_capture_grant();
        } else {
            log::warn!("Permissions denied: {:?}", denied);
            self.fail_pending(ScreenRecordError::PermissionDenied { denied });
        }
        true
    }

    /// Outcome of the screen capture intent
    pub fn on_activity_result(
        &mut self,
        request_code: i32,
        result_code: i32,
        token: Option<CaptureToken>,
    ) -> bool {
        if request_code != self.options.capture_request_code {
            return false;
        }
        if self.phase != Phase::AwaitingCaptureGrant || self.pending.is_none() {
            log::debug!("Ignoring stale capture result");
            return true;
        }

        let token = match token {
            Some(token) if result_code == RESULT_OK => token,
            _ => {
                log::info!("Screen capture declined (result code {})", result_code);
                self.fail_pending(ScreenRecordError::UserCancelled { result_code });
                return true;
            }
        };

        self.phase = Phase::Idle;
        let request = match self.pending.take() {
            Some(request) => request,
            None => return true,
        };

        apply_session_config(&mut self.recorder, &request.config);
        let grant = CaptureGrant { token, result_code };
        match self.recorder.start_screen_recording(&grant) {
            Ok(()) => {
                let path = self.recorder.file_path();
                log::info!("Recording started for request {}: {}", request.id, path);
                request.responder.success(path);
            }
            Err(e) => {
                log::error!("Recorder failed to start: {}", e);
                request.responder.error(e);
            }
        }
        true
    }

    /// Stop the recorder if it is busy. Always succeeds with `0`.
    pub fn stop_recording(&mut self) -> i32 {
        if self.recorder.is_busy_recording() {
            log::info!("Stopping screen recording");
            self.recorder.stop_screen_recording();
        } else {
            log::debug!("Stop requested while idle");
        }
        0
    }

    pub fn is_recording(&self) -> bool {
        self.recorder.is_busy_recording()
    }

    pub fn permission_report(&self) -> Vec<PermissionInfo> {
        let required = &self.options.required_permissions;
        permission_report(required, &self.platform.missing_permissions(required))
    }
}
