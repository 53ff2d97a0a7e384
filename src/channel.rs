//! Method-call surface
//!
//! Transport-independent dispatch of the plugin's method names. A
//! transport decodes an incoming call into [`MethodCall`], hands it to
//! [`handle_method_call`] together with its reply object, and relays
//! recorder notifications through a [`MethodInvoker`].

use crate::coordinator::{RecordingSessionCoordinator, StartResponder};
use crate::errors::{ErrorPayload, ScreenRecordError};
use crate::platform::Platform;
use crate::recorder::{RecorderEngine, RecorderEventSink};
use crate::types::{RecorderNotification, SessionConfig, METHOD_ON_RECORDER_LISTENER};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const METHOD_START_RECORD_SCREEN: &str = "startRecordScreen";
pub const METHOD_STOP_RECORD_SCREEN: &str = "stopRecordScreen";
pub const METHOD_IS_RECORDING: &str = "isRecording";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    pub method: String,
    #[serde(default)]
    pub arguments: Value,
}

impl MethodCall {
    pub fn new(method: impl Into<String>, arguments: Value) -> Self {
        Self {
            method: method.into(),
            arguments,
        }
    }
}

/// Reply object of a single method call
pub trait MethodResult: Send {
    fn success(self: Box<Self>, value: Value);
    fn error(self: Box<Self>, error: ErrorPayload);
    fn not_implemented(self: Box<Self>);
}

/// Outgoing calls from the plugin to the application side
pub trait MethodInvoker: Send + Sync {
    fn invoke_method(&self, method: &str, arguments: Value);
}

/// Delivers recorder notifications as `onRecorderListener` calls
pub struct ChannelEventSink<I> {
    invoker: I,
}

impl<I: MethodInvoker> ChannelEventSink<I> {
    pub fn new(invoker: I) -> Self {
        Self { invoker }
    }
}

impl<I: MethodInvoker> RecorderEventSink for ChannelEventSink<I> {
    fn emit(&self, notification: RecorderNotification) {
        match serde_json::to_value(notification) {
            Ok(payload) => self.invoker.invoke_method(METHOD_ON_RECORDER_LISTENER, payload),
            Err(e) => log::error!("Failed to encode recorder notification: {}", e),
        }
    }
}

struct ResultResponder {
    result: Box<dyn MethodResult>,
}

impl StartResponder for ResultResponder {
    fn success(self: Box<Self>, output_path: String) {
        self.result.success(Value::String(output_path));
    }

    fn error(self: Box<Self>, error: ScreenRecordError) {
        self.result.error(error.into());
    }
}

/// Dispatch one method call against the coordinator.
pub fn handle_method_call<P: Platform, E: RecorderEngine>(
    coordinator: &mut RecordingSessionCoordinator<P, E>,
    call: MethodCall,
    result: Box<dyn MethodResult>,
) {
    log::debug!("Method call: {}", call.method);
    match call.method.as_str() {
        METHOD_START_RECORD_SCREEN => match SessionConfig::from_arguments(&call.arguments) {
            Ok(config) => {
                coordinator.start_recording(config, Box::new(ResultResponder { result }))
            }
            Err(e) => {
                log::warn!("Bad {} arguments: {}", METHOD_START_RECORD_SCREEN, e);
                result.error(e.into());
            }
        },
        METHOD_STOP_RECORD_SCREEN => {
            let code = coordinator.stop_recording();
            result.success(Value::from(code));
        }
        METHOD_IS_RECORDING => result.success(Value::Bool(coordinator.is_recording())),
        other => {
            log::debug!("Method not implemented: {}", other);
            result.not_implemented();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockPlatform, MockRecorder};
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, PartialEq)]
    enum Reply {
        Success(Value),
        Error(ErrorPayload),
        NotImplemented,
    }

    #[derive(Clone, Default)]
    struct ReplySlot(Arc<Mutex<Vec<Reply>>>);

    impl ReplySlot {
        fn result(&self) -> Box<dyn MethodResult> {
            Box::new(self.clone())
        }

        fn replies(&self) -> Vec<Reply> {
            self.0.lock().unwrap().clone()
        }
    }

    impl MethodResult for ReplySlot {
        fn success(self: Box<Self>, value: Value) {
            self.0.lock().unwrap().push(Reply::Success(value));
        }
        fn error(self: Box<Self>, error: ErrorPayload) {
            self.0.lock().unwrap().push(Reply::Error(error));
        }
        fn not_implemented(self: Box<Self>) {
            self.0.lock().unwrap().push(Reply::NotImplemented);
        }
    }

    #[derive(Clone, Default)]
    struct Invocations(Arc<Mutex<Vec<(String, Value)>>>);

    impl MethodInvoker for Invocations {
        fn invoke_method(&self, method: &str, arguments: Value) {
            self.0.lock().unwrap().push((method.to_string(), arguments));
        }
    }

    fn coordinator(
        invocations: &Invocations,
    ) -> RecordingSessionCoordinator<MockPlatform, MockRecorder> {
        RecordingSessionCoordinator::new(
            MockPlatform::granted(),
            MockRecorder::new(),
            Arc::new(ChannelEventSink::new(invocations.clone())),
        )
    }

    #[test]
    fn test_unknown_method_is_not_implemented() {
        let mut c = coordinator(&Invocations::default());
        let slot = ReplySlot::default();
        handle_method_call(&mut c, MethodCall::new("pauseRecordScreen", Value::Null), slot.result());
        assert_eq!(slot.replies(), vec![Reply::NotImplemented]);
    }

    #[test]
    fn test_stop_while_idle_answers_zero() {
        let mut c = coordinator(&Invocations::default());
        let slot = ReplySlot::default();
        handle_method_call(&mut c, MethodCall::new(METHOD_STOP_RECORD_SCREEN, Value::Null), slot.result());
        assert_eq!(slot.replies(), vec![Reply::Success(Value::from(0))]);
    }

    #[test]
    fn test_bad_start_arguments() {
        let mut c = coordinator(&Invocations::default());
        let slot = ReplySlot::default();
        let args = serde_json::json!({ "isAudioEnabled": "yes" });
        handle_method_call(&mut c, MethodCall::new(METHOD_START_RECORD_SCREEN, args), slot.result());

        match slot.replies().as_slice() {
            [Reply::Error(payload)] => assert_eq!(payload.code, "ERROR_CODE_INVALID_ARGUMENTS"),
            other => panic!("unexpected replies: {:?}", other),
        }
        assert!(!c.has_pending_request());
    }

    #[test]
    fn test_recorder_events_become_listener_calls() {
        let invocations = Invocations::default();
        let recorder = MockRecorder::new();
        let _c = RecordingSessionCoordinator::new(
            MockPlatform::granted(),
            recorder.clone(),
            Arc::new(ChannelEventSink::new(invocations.clone())),
        );

        recorder.fire_error(-3, "disk full");
        recorder.fire_complete();

        let calls = invocations.0.lock().unwrap().clone();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].0, "onRecorderListener");
        assert_eq!(calls[0].1, serde_json::json!({ "isCompleted": false, "errCode": -3 }));
        assert_eq!(calls[1].1, serde_json::json!({ "isCompleted": true, "errCode": 0 }));
    }
}
