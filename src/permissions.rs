//! Android runtime permissions needed before a capture grant is requested.

use crate::errors::ScreenRecordError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// `PackageManager.PERMISSION_GRANTED`
pub const PERMISSION_GRANTED: i32 = 0;
/// `PackageManager.PERMISSION_DENIED`
pub const PERMISSION_DENIED: i32 = -1;

/// Runtime permission the recorder depends on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permission {
    #[serde(rename = "android.permission.RECORD_AUDIO")]
    RecordAudio,
    #[serde(rename = "android.permission.WRITE_EXTERNAL_STORAGE")]
    WriteExternalStorage,
    #[serde(rename = "android.permission.READ_EXTERNAL_STORAGE")]
    ReadExternalStorage,
}

impl Permission {
    pub fn as_android_str(&self) -> &'static str {
        match self {
            Permission::RecordAudio => "android.permission.RECORD_AUDIO",
            Permission::WriteExternalStorage => "android.permission.WRITE_EXTERNAL_STORAGE",
            Permission::ReadExternalStorage => "android.permission.READ_EXTERNAL_STORAGE",
        }
    }

    /// Microphone plus storage read/write.
    pub fn required() -> Vec<Permission> {
        vec![
            Permission::RecordAudio,
            Permission::WriteExternalStorage,
            Permission::ReadExternalStorage,
        ]
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_android_str())
    }
}

impl FromStr for Permission {
    type Err = ScreenRecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "android.permission.RECORD_AUDIO" | "RECORD_AUDIO" => Ok(Permission::RecordAudio),
            "android.permission.WRITE_EXTERNAL_STORAGE" | "WRITE_EXTERNAL_STORAGE" => {
                Ok(Permission::WriteExternalStorage)
            }
            "android.permission.READ_EXTERNAL_STORAGE" | "READ_EXTERNAL_STORAGE" => {
                Ok(Permission::ReadExternalStorage)
            }
            other => Err(ScreenRecordError::Config(format!(
                "Unknown permission: {}",
                other
            ))),
        }
    }
}

/// Permission status enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionStatus {
    /// Permission granted
    Granted,
    /// Permission denied
    Denied,
}

impl PermissionStatus {
    /// Map a `PackageManager` grant code. Anything but granted is a denial.
    pub fn from_grant_code(code: i32) -> Self {
        if code == PERMISSION_GRANTED {
            PermissionStatus::Granted
        } else {
            PermissionStatus::Denied
        }
    }

    pub fn is_granted(&self) -> bool {
        matches!(self, PermissionStatus::Granted)
    }
}

impl std::fmt::Display for PermissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PermissionStatus::Granted => write!(f, "granted"),
            PermissionStatus::Denied => write!(f, "denied"),
        }
    }
}

/// Detailed permission information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionInfo {
    pub permission: Permission,
    pub status: PermissionStatus,
}

/// Build a per-permission report from the list of missing permissions.
pub fn permission_report(required: &[Permission], missing: &[Permission]) -> Vec<PermissionInfo> {
    required
        .iter()
        .map(|permission| PermissionInfo {
            permission: *permission,
            status: if missing.contains(permission) {
                PermissionStatus::Denied
            } else {
                PermissionStatus::Granted
            },
        })
        .collect()
}

/// Evaluate a permission-result vector.
///
/// Returns the permissions that were not granted. `results` is positional
/// against `requested`; a requested permission with no result counts as
/// denied, so an empty vector (interrupted dialog) denies everything.
pub fn denied_permissions(
    requested: &[Permission],
    results: &[PermissionStatus],
) -> Vec<Permission> {
    requested
        .iter()
        .enumerate()
        .filter(|(i, _)| !results.get(*i).map(|s| s.is_granted()).unwrap_or(false))
        .map(|(_, p)| *p)
        .collect()
}
