use tempfile::TempDir;
use websteps_engine::action::Action;
use websteps_engine::capture::CaptureSettings;
use websteps_engine::replay::{
    ReplayError, ScriptLine, parse_line, replay_file, replay_script, run_live,
};

const SEARCH_SCRIPT: &str = r#"
# search for a crate
{"type": "setRecordingState", "isRecording": true}
{"event": "focus", "target": {"tag": "input", "id": "q", "value": ""}}
{"event": "input", "target": {"tag": "input", "id": "q", "value": "s"}}
{"event": "input", "target": {"tag": "input", "id": "q", "value": "se"}}
{"event": "input", "target": {"tag": "input", "id": "q", "value": "serde"}}
{"wait_ms": 1500}
{"event": "click", "target": {"tag": "button", "class": "search-btn", "text": " Search "}}
{"event": "click", "target": {"tag": "button", "class": "search-btn", "text": " Search "}}
{"type": "setRecordingState", "isRecording": false}
"#;

fn expected() -> Vec<Action> {
    vec![
        Action::input("#q", "serde"),
        Action::click("button.search-btn", Some("Search".into())),
    ]
}

#[test]
fn test_parse_line_kinds() {
    assert_eq!(parse_line("   ", 1).unwrap(), None);
    assert_eq!(parse_line("# note", 2).unwrap(), None);
    assert!(matches!(
        parse_line(r#"{"type": "clearActions"}"#, 3).unwrap(),
        Some(ScriptLine::Control(_))
    ));
    assert!(matches!(
        parse_line(r#"{"event": "submit"}"#, 4).unwrap(),
        Some(ScriptLine::Dom(_))
    ));
    assert!(matches!(
        parse_line(r#"{"wait_ms": 10}"#, 5).unwrap(),
        Some(ScriptLine::Wait(_))
    ));
}

#[test]
fn test_parse_error_reports_line() {
    let script = "{\"type\": \"getRecordingState\"}\n\n{\"event\": \"hover\"}\n";
    let Err(ReplayError::Parse { line, .. }) =
        replay_script(script, CaptureSettings::default())
    else {
        panic!("expected a parse error");
    };
    assert_eq!(line, 3);
}

#[test]
fn test_replay_script_settles_and_stores() {
    let recorder = replay_script(SEARCH_SCRIPT, CaptureSettings::default()).unwrap();
    assert!(!recorder.is_recording());
    assert_eq!(recorder.stored_actions(), expected());
    assert_eq!(recorder.engine().scheduler().pending_count(), 0);
}

#[test]
fn test_wait_advances_virtual_clock() {
    let script = r#"
{"type": "setRecordingState", "isRecording": true}
{"event": "input", "target": {"tag": "input", "id": "q", "value": ""}}
{"event": "input", "target": {"tag": "input", "id": "q", "value": "x"}}
{"wait_ms": 400}
"#;
    let recorder = replay_script(script, CaptureSettings::default()).unwrap();
    let engine = recorder.engine();
    assert_eq!(engine.scheduler().now().as_millis(), 400);
    assert!(engine.pending("#q").unwrap().pending_commit.is_some());
}

#[tokio::test]
async fn test_replay_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("session.jsonl");
    tokio::fs::write(&path, SEARCH_SCRIPT).await.unwrap();

    let recorder = replay_file(&path, CaptureSettings::default()).await.unwrap();
    assert_eq!(recorder.stored_actions(), expected());
}

#[tokio::test]
async fn test_replay_file_missing() {
    let temp_dir = TempDir::new().unwrap();
    let result = replay_file(&temp_dir.path().join("none.jsonl"), CaptureSettings::default()).await;
    assert!(matches!(result, Err(ReplayError::Io(_))));
}

#[tokio::test(start_paused = true)]
async fn test_run_live_delivers_real_timers() {
    let script = r#"{"type": "setRecordingState", "isRecording": true}
{"event": "focus", "target": {"tag": "input", "id": "q", "value": ""}}
{"event": "input", "target": {"tag": "input", "id": "q", "value": "tokio"}}
{"wait_ms": 1500}
"#;
    let mut recorder = run_live(script.as_bytes(), CaptureSettings::default())
        .await
        .unwrap();

    assert!(recorder.is_recording());
    let record = recorder.engine().pending("#q").unwrap();
    assert_eq!(record.pending_commit, None);
    assert_eq!(record.log_index, Some(0));

    recorder.stop();
    assert_eq!(recorder.stored_actions(), vec![Action::input("#q", "tokio")]);
}
