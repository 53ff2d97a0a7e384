//! Host platform seam: runtime permissions and screen capture grants.
//!
//! Both requests are fire-and-forget. Their outcomes come back later as
//! [`PlatformEvent`]s carrying the request code they were issued with.

use crate::errors::ScreenRecordResult;
use crate::permissions::{Permission, PermissionStatus};
use crate::types::CaptureToken;
use serde::{Deserialize, Serialize};

#[cfg(target_os = "android")]
pub mod android;
pub mod unsupported;

#[cfg(target_os = "android")]
pub use android::{AndroidPlatform, AndroidRecorder};
pub use unsupported::{UnsupportedPlatform, UnsupportedRecorder};

/// Permission and capture-grant requests issued by the coordinator
pub trait Platform {
    /// Subset of `required` not currently granted
    fn missing_permissions(&self, required: &[Permission]) -> Vec<Permission>;

    /// Show the runtime permission dialog. Answered by
    /// [`PlatformEvent::PermissionsResult`].
    fn request_permissions(
        &mut self,
        permissions: &[Permission],
        request_code: i32,
    ) -> ScreenRecordResult<()>;

    /// Launch the screen capture intent. Answered by
    /// [`PlatformEvent::ActivityResult`].
    fn request_capture_grant(&mut self, request_code: i32) -> ScreenRecordResult<()>;
}

impl<T: Platform + ?Sized> Platform for Box<T> {
    fn missing_permissions(&self, required: &[Permission]) -> Vec<Permission> {
        (**self).missing_permissions(required)
    }

    fn request_permissions(
        &mut self,
        permissions: &[Permission],
        request_code: i32,
    ) -> ScreenRecordResult<()> {
        (**self).request_permissions(permissions, request_code)
    }

    fn request_capture_grant(&mut self, request_code: i32) -> ScreenRecordResult<()> {
        (**self).request_capture_grant(request_code)
    }
}

/// Result callbacks delivered by the host platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlatformEvent {
    PermissionsResult {
        request_code: i32,
        permissions: Vec<Permission>,
        results: Vec<PermissionStatus>,
    },
    ActivityResult {
        request_code: i32,
        result_code: i32,
        token: Option<CaptureToken>,
    },
    /// The native side could not carry out the request at all
    RequestFailed { request_code: i32, message: String },
}

impl PlatformEvent {
    pub fn request_code(&self) -> i32 {
        match self {
            PlatformEvent::PermissionsResult { request_code, .. } => *request_code,
            PlatformEvent::ActivityResult { request_code, .. } => *request_code,
            PlatformEvent::RequestFailed { request_code, .. } => *request_code,
        }
    }
}
