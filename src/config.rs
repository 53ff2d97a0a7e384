//! Configuration management for screenrec
//!
//! Provides configuration loading, saving, and validation for the request
//! codes, pending-request policy, required permissions, event naming and
//! logging level.

use crate::coordinator::{CoordinatorOptions, PendingPolicy};
use crate::errors::ScreenRecordError;
use crate::permissions::Permission;
use crate::types::{METHOD_ON_RECORDER_LISTENER, PERMISSIONS_REQUEST_CODE, SCREEN_RECORD_REQUEST_CODE};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// File name of the plugin configuration
pub const CONFIG_FILE_NAME: &str = "screenrec.toml";

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenRecConfig {
    pub channel: ChannelConfig,
    pub requests: RequestConfig,
    pub permissions: PermissionConfig,
    pub logging: LoggingConfig,
}

/// Naming of the push surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Event name used for recorder notifications
    pub recorder_event: String,
}

/// Handshake request settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestConfig {
    /// Request code of the runtime permission dialog
    pub permission_request_code: i32,
    /// Request code of the screen capture intent
    pub capture_request_code: i32,
    /// Behaviour on a start request while one is pending
    pub pending_policy: PendingPolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PermissionConfig {
    /// Permissions checked before the capture grant, Android names
    pub required: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// off, error, warn, info, debug or trace
    pub level: String,
}

impl Default for ScreenRecConfig {
    fn default() -> Self {
        Self {
            channel: ChannelConfig {
                recorder_event: METHOD_ON_RECORDER_LISTENER.to_string(),
            },
            requests: RequestConfig {
                permission_request_code: PERMISSIONS_REQUEST_CODE,
                capture_request_code: SCREEN_RECORD_REQUEST_CODE,
                pending_policy: PendingPolicy::Replace,
            },
            permissions: PermissionConfig {
                required: Permission::required()
                    .iter()
                    .map(|p| p.as_android_str().to_string())
                    .collect(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }
}

impl ScreenRecConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ScreenRecordError> {
        let path = path.as_ref();

        if !path.exists() {
            log::info!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|e| {
            ScreenRecordError::Config(format!("Failed to read config file: {}", e))
        })?;

        let config: ScreenRecConfig = toml::from_str(&contents).map_err(|e| {
            ScreenRecordError::Config(format!("Failed to parse config file: {}", e))
        })?;

        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ScreenRecordError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    ScreenRecordError::Config(format!("Failed to create config directory: {}", e))
                })?;
            }
        }

        let toml_string = toml::to_string_pretty(self).map_err(|e| {
            ScreenRecordError::Config(format!("Failed to serialize config: {}", e))
        })?;

        fs::write(path, toml_string).map_err(|e| {
            ScreenRecordError::Config(format!("Failed to write config file: {}", e))
        })?;

        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Get default config file path
    pub fn default_path() -> PathBuf {
        PathBuf::from(CONFIG_FILE_NAME)
    }

    /// Load from `path` or fall back to defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        Self::load_from_file(path).unwrap_or_else(|e| {
            log::warn!("Failed to load config, using defaults: {}", e);
            Self::default()
        })
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.channel.recorder_event.trim().is_empty() {
            return Err("Recorder event name must not be empty".to_string());
        }

        // Activity request codes are limited to the lower 16 bits.
        let valid_code = |code: i32| (0..=0xFFFF).contains(&code);
        if !valid_code(self.requests.permission_request_code) {
            return Err("Permission request code must be between 0 and 65535".to_string());
        }
        if !valid_code(self.requests.capture_request_code) {
            return Err("Capture request code must be between 0 and 65535".to_string());
        }
        if self.requests.permission_request_code == self.requests.capture_request_code {
            return Err("Permission and capture request codes must differ".to_string());
        }

        self.required_permissions().map_err(|e| e.to_string())?;

        self.log_level()?;

        Ok(())
    }

    pub fn required_permissions(&self) -> Result<Vec<Permission>, ScreenRecordError> {
        let mut permissions = Vec::with_capacity(self.permissions.required.len());
        for name in &self.permissions.required {
            let permission = Permission::from_str(name)?;
            if !permissions.contains(&permission) {
                permissions.push(permission);
            }
        }
        Ok(permissions)
    }

    pub fn log_level(&self) -> Result<log::LevelFilter, String> {
        log::LevelFilter::from_str(&self.logging.level)
            .map_err(|_| format!("Invalid log level: {}", self.logging.level))
    }

    /// Coordinator options described by this configuration
    pub fn coordinator_options(&self) -> Result<CoordinatorOptions, ScreenRecordError> {
        Ok(CoordinatorOptions {
            permission_request_code: self.requests.permission_request_code,
            capture_request_code: self.requests.capture_request_code,
            pending_policy: self.requests.pending_policy,
            required_permissions: self.required_permissions()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ScreenRecConfig::default();
        assert_eq!(config.requests.permission_request_code, 555);
        assert_eq!(config.requests.capture_request_code, 333);
        assert_eq!(config.requests.pending_policy, PendingPolicy::Replace);
        assert_eq!(config.channel.recorder_event, "onRecorderListener");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut same_codes = ScreenRecConfig::default();
        same_codes.requests.capture_request_code = 555;
        assert!(same_codes.validate().is_err());

        let mut big_code = ScreenRecConfig::default();
        big_code.requests.permission_request_code = 70_000;
        assert!(big_code.validate().is_err());

        let mut bad_permission = ScreenRecConfig::default();
        bad_permission.permissions.required.push("android.permission.CAMERA".to_string());
        assert!(bad_permission.validate().is_err());

        let mut bad_level = ScreenRecConfig::default();
        bad_level.logging.level = "loud".to_string();
        assert!(bad_level.validate().is_err());
    }

    #[test]
    fn test_config_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("nested").join("screenrec.toml");

        let mut config = ScreenRecConfig::default();
        config.requests.pending_policy = PendingPolicy::Reject;
        config.save_to_file(&config_path).unwrap();

        let loaded = ScreenRecConfig::load_from_file(&config_path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_config_toml_format() {
        let toml_string = toml::to_string_pretty(&ScreenRecConfig::default()).unwrap();
        assert!(toml_string.contains("[channel]"));
        assert!(toml_string.contains("[requests]"));
        assert!(toml_string.contains("[permissions]"));
        assert!(toml_string.contains("[logging]"));
        assert!(toml_string.contains("pending_policy = \"replace\""));
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = ScreenRecConfig::load_from_file("nonexistent_screenrec.toml");
        assert_eq!(result.unwrap(), ScreenRecConfig::default());
    }

    #[test]
    fn test_coordinator_options_dedupe_permissions() {
        let mut config = ScreenRecConfig::default();
        config.permissions.required = vec![
            "RECORD_AUDIO".to_string(),
            "android.permission.RECORD_AUDIO".to_string(),
        ];
        let options = config.coordinator_options().unwrap();
        assert_eq!(options.required_permissions, vec![Permission::RecordAudio]);
    }

    #[test]
    fn test_log_level_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);
        let mut config = ScreenRecConfig::default();
        config.logging.level = "debug".to_string();
        config.save_to_file(&config_path).unwrap();

        let loaded = ScreenRecConfig::load_or_default(&config_path);
        assert_eq!(loaded.log_level().unwrap(), log::LevelFilter::Debug);
    }

    #[test]
    fn test_unreadable_config_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&config_path, "not = [valid").unwrap();
        assert_eq!(ScreenRecConfig::load_or_default(&config_path), ScreenRecConfig::default());
    }
}
