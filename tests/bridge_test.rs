#[cfg(test)]
mod bridge_tests {
    use screenrec::bridge::{run_event_pump, ScreenRecordingState};
    use screenrec::coordinator::{CoordinatorOptions, PendingPolicy};
    use screenrec::errors::ScreenRecordError;
    use screenrec::permissions::{Permission, PermissionStatus};
    use screenrec::platform::{PlatformEvent, UnsupportedPlatform, UnsupportedRecorder};
    use screenrec::testing::{AutoAnswer, CollectingSink, MockPlatform, MockRecorder};
    use screenrec::types::{
        CaptureToken, SessionConfig, SessionState, RESULT_OK, SCREEN_RECORD_REQUEST_CODE,
    };
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::mpsc;
    use tokio::time::timeout;
    use tokio_test::{assert_pending, assert_ready};

    fn auto_state(
        platform: MockPlatform,
        answer: AutoAnswer,
        options: CoordinatorOptions,
    ) -> (ScreenRecordingState, MockRecorder) {
        let (tx, rx) = mpsc::unbounded_channel();
        let recorder = MockRecorder::new();
        let state = ScreenRecordingState::build(
            Box::new(platform.responding(tx, answer)),
            Box::new(recorder.clone()),
            Arc::new(CollectingSink::default()),
            options,
        );
        tokio::spawn(run_event_pump(state.clone(), rx));
        (state, recorder)
    }

    #[tokio::test]
    async fn test_start_resolves_through_event_pump() {
        let answer = AutoAnswer {
            grant_permissions: true,
            accept_capture: true,
        };
        let (state, recorder) = auto_state(
            MockPlatform::missing(&[Permission::RecordAudio]),
            answer,
            CoordinatorOptions::default(),
        );

        let config = SessionConfig::new().with_output_path("/sdcard").with_file_name("clip");
        let path = timeout(Duration::from_secs(5), state.start_and_wait(config))
            .await
            .expect("start timed out")
            .unwrap();

        assert_eq!(path, "/sdcard/clip.mp4");
        assert!(state.is_recording().await.unwrap());
        assert_eq!(state.session_state().await.unwrap(), SessionState::Recording);
        assert_eq!(recorder.last_grant().unwrap().token.as_str(), "projection-1");

        assert_eq!(state.stop().await.unwrap(), 0);
        assert!(!state.is_recording().await.unwrap());
    }

    #[tokio::test]
    async fn test_denied_permissions_through_event_pump() {
        let answer = AutoAnswer {
            grant_permissions: false,
            accept_capture: true,
        };
        let (state, recorder) = auto_state(
            MockPlatform::missing(&[Permission::WriteExternalStorage]),
            answer,
            CoordinatorOptions::default(),
        );

        let err = timeout(Duration::from_secs(5), state.start_and_wait(SessionConfig::new()))
            .await
            .expect("start timed out")
            .unwrap_err();

        assert_eq!(err.code(), "ERROR_CODE_PERMISSION_DENIED");
        assert!(!recorder.started());
        assert!(!state.is_recording().await.unwrap());
    }

    #[tokio::test]
    async fn test_declined_capture_through_event_pump() {
        let answer = AutoAnswer {
            grant_permissions: true,
            accept_capture: false,
        };
        let (state, _recorder) =
            auto_state(MockPlatform::granted(), answer, CoordinatorOptions::default());

        let err = state.start_and_wait(SessionConfig::new()).await.unwrap_err();
        assert_eq!(err.code(), "ERROR_CODE_CANCEL");
        assert_eq!(state.session_state().await.unwrap(), SessionState::Idle);
    }

    #[tokio::test]
    async fn test_start_stays_pending_until_capture_result() {
        let recorder = MockRecorder::new();
        let state = ScreenRecordingState::build(
            Box::new(MockPlatform::granted()),
            Box::new(recorder.clone()),
            Arc::new(CollectingSink::default()),
            CoordinatorOptions::default(),
        );

        let mut start = tokio_test::task::spawn(state.start(SessionConfig::new()).await.unwrap());
        assert_pending!(start.poll());
        assert_eq!(state.session_state().await.unwrap(), SessionState::AwaitingCaptureGrant);

        // Unrelated request code leaves the request untouched.
        let consumed = state
            .dispatch(PlatformEvent::ActivityResult {
                request_code: 9,
                result_code: RESULT_OK,
                token: Some(CaptureToken::new("other")),
            })
            .await
            .unwrap();
        assert!(!consumed);
        assert_pending!(start.poll());

        state
            .dispatch(PlatformEvent::ActivityResult {
                request_code: SCREEN_RECORD_REQUEST_CODE,
                result_code: RESULT_OK,
                token: Some(CaptureToken::new("grant")),
            })
            .await
            .unwrap();

        assert!(start.is_woken());
        let outcome = assert_ready!(start.poll()).unwrap();
        assert_eq!(outcome.unwrap(), "/storage/emulated/0/Movies/screen_recording.mp4");
    }

    #[tokio::test]
    async fn test_replaced_request_surfaces_as_superseded() {
        let state = ScreenRecordingState::build(
            Box::new(MockPlatform::granted()),
            Box::new(MockRecorder::new()),
            Arc::new(CollectingSink::default()),
            CoordinatorOptions::default(),
        );

        let first = state.start(SessionConfig::new()).await.unwrap();
        let _second = state.start(SessionConfig::new()).await.unwrap();

        let outcome = first.await;
        assert!(outcome.is_err(), "dropped continuation closes the channel");
    }

    #[tokio::test]
    async fn test_start_and_wait_maps_dropped_continuation() {
        let state = ScreenRecordingState::build(
            Box::new(MockPlatform::granted()),
            Box::new(MockRecorder::new()),
            Arc::new(CollectingSink::default()),
            CoordinatorOptions::default(),
        );

        let waiting = {
            let state = state.clone();
            tokio::spawn(async move { state.start_and_wait(SessionConfig::new()).await })
        };
        // Let the first request register before replacing it.
        while state.session_state().await.unwrap() != SessionState::AwaitingCaptureGrant {
            tokio::task::yield_now().await;
        }
        let _second = state.start(SessionConfig::new()).await.unwrap();

        let outcome = timeout(Duration::from_secs(5), waiting).await.unwrap().unwrap();
        assert_eq!(outcome, Err(ScreenRecordError::Superseded));
    }

    #[tokio::test]
    async fn test_reject_policy_answers_immediately() {
        let options = CoordinatorOptions {
            pending_policy: PendingPolicy::Reject,
            ..CoordinatorOptions::default()
        };
        let state = ScreenRecordingState::build(
            Box::new(MockPlatform::granted()),
            Box::new(MockRecorder::new()),
            Arc::new(CollectingSink::default()),
            options,
        );

        let _first = state.start(SessionConfig::new()).await.unwrap();
        let second = state.start_and_wait(SessionConfig::new()).await;
        assert_eq!(second, Err(ScreenRecordError::RequestPending));
    }

    #[tokio::test]
    async fn test_options_cannot_change_mid_handshake() {
        let state = ScreenRecordingState::build(
            Box::new(MockPlatform::granted()),
            Box::new(MockRecorder::new()),
            Arc::new(CollectingSink::default()),
            CoordinatorOptions::default(),
        );
        let _pending = state.start(SessionConfig::new()).await.unwrap();
        assert_eq!(
            state.apply_options(CoordinatorOptions::default()).await,
            Err(ScreenRecordError::RequestPending)
        );
    }

    #[tokio::test]
    async fn test_unsupported_host() {
        let state = ScreenRecordingState::build(
            Box::new(UnsupportedPlatform),
            Box::new(UnsupportedRecorder::default()),
            Arc::new(CollectingSink::default()),
            CoordinatorOptions::default(),
        );

        let err = state.start_and_wait(SessionConfig::new()).await.unwrap_err();
        assert_eq!(err.code(), "ERROR_CODE_UNSUPPORTED");
        assert_eq!(state.stop().await.unwrap(), 0);
        assert!(!state.is_recording().await.unwrap());

        let report = state.permission_report().await.unwrap();
        assert!(report.iter().all(|p| p.status == PermissionStatus::Granted));
    }

    #[tokio::test]
    async fn test_native_failure_through_event_pump() {
        let (tx, rx) = mpsc::unbounded_channel();
        let state = ScreenRecordingState::build(
            Box::new(MockPlatform::granted()),
            Box::new(MockRecorder::new()),
            Arc::new(CollectingSink::default()),
            CoordinatorOptions::default(),
        );
        tokio::spawn(run_event_pump(state.clone(), rx));

        let pending = state.start(SessionConfig::new()).await.unwrap();
        tx.send(PlatformEvent::RequestFailed {
            request_code: SCREEN_RECORD_REQUEST_CODE,
            message: "requestCaptureGrant: activity gone".to_string(),
        })
        .unwrap();

        let outcome = timeout(Duration::from_secs(5), pending).await.unwrap().unwrap();
        assert_eq!(outcome.unwrap_err().code(), "ERROR_CODE_PLATFORM");
        assert_eq!(state.session_state().await.unwrap(), SessionState::Idle);
    }
}
