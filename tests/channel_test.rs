#[cfg(test)]
mod channel_tests {
    use screenrec::channel::{handle_method_call, MethodCall, MethodResult};
    use screenrec::errors::ErrorPayload;
    use screenrec::testing::{CollectingSink, MockPlatform, MockRecorder};
    use screenrec::types::{CaptureToken, RESULT_CANCELED, RESULT_OK, SCREEN_RECORD_REQUEST_CODE};
    use screenrec::RecordingSessionCoordinator;
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Replies(Arc<Mutex<Vec<Result<Value, ErrorPayload>>>>);

    impl Replies {
        fn take(&self) -> Vec<Result<Value, ErrorPayload>> {
            std::mem::take(&mut *self.0.lock().unwrap())
        }
    }

    impl MethodResult for Replies {
        fn success(self: Box<Self>, value: Value) {
            self.0.lock().unwrap().push(Ok(value));
        }
        fn error(self: Box<Self>, error: ErrorPayload) {
            self.0.lock().unwrap().push(Err(error));
        }
        fn not_implemented(self: Box<Self>) {
            panic!("unexpected not_implemented");
        }
    }

    fn call(
        coordinator: &mut RecordingSessionCoordinator<MockPlatform, MockRecorder>,
        replies: &Replies,
        method: &str,
        arguments: Value,
    ) {
        handle_method_call(
            coordinator,
            MethodCall::new(method, arguments),
            Box::new(replies.clone()),
        );
    }

    #[test]
    fn test_full_recording_round() {
        let recorder = MockRecorder::new();
        let mut c = RecordingSessionCoordinator::new(
            MockPlatform::granted(),
            recorder.clone(),
            Arc::new(CollectingSink::default()),
        );
        let replies = Replies::default();

        call(&mut c, &replies, "isRecording", Value::Null);
        assert_eq!(replies.take(), vec![Ok(json!(false))]);

        let args = json!({
            "outputPath": "/tmp",
            "fileName": "a",
            "isAudioEnabled": true
        });
        call(&mut c, &replies, "startRecordScreen", args);
        assert!(replies.take().is_empty(), "start must not resolve before the grant");

        c.on_activity_result(SCREEN_RECORD_REQUEST_CODE, RESULT_OK, Some(CaptureToken::new("g")));
        assert_eq!(replies.take(), vec![Ok(json!("/tmp/a.mp4"))]);
        assert_eq!(recorder.settings().audio_bitrate, None);

        call(&mut c, &replies, "isRecording", Value::Null);
        assert_eq!(replies.take(), vec![Ok(json!(true))]);

        call(&mut c, &replies, "stopRecordScreen", Value::Null);
        call(&mut c, &replies, "isRecording", Value::Null);
        assert_eq!(replies.take(), vec![Ok(json!(0)), Ok(json!(false))]);
    }

    #[test]
    fn test_cancelled_grant_error_payload() {
        let mut c = RecordingSessionCoordinator::new(
            MockPlatform::granted(),
            MockRecorder::new(),
            Arc::new(CollectingSink::default()),
        );
        let replies = Replies::default();

        call(&mut c, &replies, "startRecordScreen", json!({}));
        c.on_activity_result(SCREEN_RECORD_REQUEST_CODE, RESULT_CANCELED, None);

        match replies.take().as_slice() {
            [Err(payload)] => {
                assert_eq!(payload.code, "ERROR_CODE_CANCEL");
                assert!(payload.message.is_some());
            }
            other => panic!("unexpected replies: {:?}", other),
        }
    }
}
