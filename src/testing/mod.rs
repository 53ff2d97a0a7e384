//! Testing utilities for screenrec
//!
//! Scriptable stand-ins for the host platform and the recording engine, so
//! the handshake can be exercised without a device. Handles are cheap
//! clones sharing state, which keeps them inspectable after being moved
//! into a coordinator.

pub mod mock_platform;
pub mod mock_recorder;

pub use mock_platform::{AutoAnswer, MockPlatform};
pub use mock_recorder::{MockRecorder, MockSettings};

use crate::coordinator::StartResponder;
use crate::errors::ScreenRecordError;
use crate::recorder::RecorderEventSink;
use crate::types::RecorderNotification;
use std::sync::{Arc, Mutex};

/// Sink that keeps every push notification
#[derive(Default)]
pub struct CollectingSink {
    notifications: Mutex<Vec<RecorderNotification>>,
}

impl CollectingSink {
    pub fn notifications(&self) -> Vec<RecorderNotification> {
        self.notifications
            .lock()
            .map(|n| n.clone())
            .unwrap_or_default()
    }
}

impl RecorderEventSink for CollectingSink {
    fn emit(&self, notification: RecorderNotification) {
        if let Ok(mut notifications) = self.notifications.lock() {
            notifications.push(notification);
        }
    }
}

#[derive(Default)]
struct ProbeState {
    outcome: Option<Result<String, ScreenRecordError>>,
    resolutions: usize,
}

/// Records how (and how often) a start continuation was resolved
#[derive(Clone, Default)]
pub struct ResponderProbe {
    state: Arc<Mutex<ProbeState>>,
}

impl ResponderProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn responder(&self) -> Box<dyn StartResponder> {
        Box::new(ProbeResponder {
            state: self.state.clone(),
        })
    }

    /// Last outcome, `None` while unresolved
    pub fn outcome(&self) -> Option<Result<String, ScreenRecordError>> {
        self.state.lock().ok().and_then(|s| s.outcome.clone())
    }

    pub fn resolutions(&self) -> usize {
        self.state.lock().map(|s| s.resolutions).unwrap_or(0)
    }
}

struct ProbeResponder {
    state: Arc<Mutex<ProbeState>>,
}

impl ProbeResponder {
    fn resolve(&self, outcome: Result<String, ScreenRecordError>) {
        if let Ok(mut state) = self.state.lock() {
            state.outcome = Some(outcome);
            state.resolutions += 1;
        }
    }
}

impl StartResponder for ProbeResponder {
    fn success(self: Box<Self>, output_path: String) {
        self.resolve(Ok(output_path));
    }

    fn error(self: Box<Self>, error: ScreenRecordError) {
        self.resolve(Err(error));
    }
}
