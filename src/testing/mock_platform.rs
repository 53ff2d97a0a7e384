use crate::errors::{ScreenRecordError, ScreenRecordResult};
use crate::permissions::{Permission, PermissionStatus};
use crate::platform::{Platform, PlatformEvent};
use crate::types::{CaptureToken, RESULT_CANCELED, RESULT_OK};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc::UnboundedSender;

/// How an auto-responding platform answers dialogs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoAnswer {
    pub grant_permissions: bool,
    pub accept_capture: bool,
}

#[derive(Default)]
struct PlatformLog {
    permission_requests: Vec<(Vec<Permission>, i32)>,
    capture_requests: Vec<i32>,
    grants_issued: usize,
}

/// Scriptable platform. Without a responder attached, requests are only
/// logged and the test delivers results by hand.
#[derive(Clone, Default)]
pub struct MockPlatform {
    missing: Vec<Permission>,
    fail_capture: bool,
    fail_permissions: bool,
    responder: Option<(UnboundedSender<PlatformEvent>, AutoAnswer)>,
    log: Arc<Mutex<PlatformLog>>,
}

impl MockPlatform {
    /// Every permission already granted
    pub fn granted() -> Self {
        Self::default()
    }

    pub fn missing(permissions: &[Permission]) -> Self {
        Self {
            missing: permissions.to_vec(),
            ..Self::default()
        }
    }

    pub fn failing_capture(mut self) -> Self {
        self.fail_capture = true;
        self
    }

    pub fn failing_permissions(mut self) -> Self {
        self.fail_permissions = true;
        self
    }

    /// Answer every request by pushing an event into `events`.
    pub fn responding(mut self, events: UnboundedSender<PlatformEvent>, answer: AutoAnswer) -> Self {
        self.responder = Some((events, answer));
        self
    }

    pub fn permission_requests(&self) -> Vec<(Vec<Permission>, i32)> {
        self.log
            .lock()
            .map(|l| l.permission_requests.clone())
            .unwrap_or_default()
    }

    pub fn capture_requests(&self) -> Vec<i32> {
        self.log
            .lock()
            .map(|l| l.capture_requests.clone())
            .unwrap_or_default()
    }

    fn next_token(&self) -> CaptureToken {
        let n = self
            .log
            .lock()
            .map(|mut l| {
                l.grants_issued += 1;
                l.grants_issued
            })
            .unwrap_or(0);
        CaptureToken::new(format!("projection-{}", n))
    }
}

impl Platform for MockPlatform {
    fn missing_permissions(&self, required: &[Permission]) -> Vec<Permission> {
        required
            .iter()
            .filter(|p| self.missing.contains(p))
            .copied()
            .collect()
    }

    fn request_permissions(
        &mut self,
        permissions: &[Permission],
        request_code: i32,
    ) -> ScreenRecordResult<()> {
        if let Ok(mut log) = self.log.lock() {
            log.permission_requests
                .push((permissions.to_vec(), request_code));
        }
        if self.fail_permissions {
            return Err(ScreenRecordError::Platform(
                "permission dialog unavailable".to_string(),
            ));
        }
        if let Some((events, answer)) = &self.responder {
            let status = if answer.grant_permissions {
                PermissionStatus::Granted
            } else {
                PermissionStatus::Denied
            };
            let _ = events.send(PlatformEvent::PermissionsResult {
                request_code,
                permissions: permissions.to_vec(),
                results: vec![status; permissions.len()],
            });
        }
        Ok(())
    }

    fn request_capture_grant(&mut self, request_code: i32) -> ScreenRecordResult<()> {
        if let Ok(mut log) = self.log.lock() {
            log.capture_requests.push(request_code);
        }
        if self.fail_capture {
            return Err(ScreenRecordError::Platform(
                "media projection service unavailable".to_string(),
            ));
        }
        if let Some((events, answer)) = &self.responder {
            let event = if answer.accept_capture {
                PlatformEvent::ActivityResult {
                    request_code,
                    result_code: RESULT_OK,
                    token: Some(self.next_token()),
                }
            } else {
                PlatformEvent::ActivityResult {
                    request_code,
                    result_code: RESULT_CANCELED,
                    token: None,
                }
            };
            let _ = events.send(event);
        }
        Ok(())
    }
}
