use tempfile::TempDir;
use websteps_engine::action::Action;
use websteps_engine::export::{
    DirectorySink, EXPORT_FILENAME, ExportOutcome, STEPS_FILENAME, actions_to_json,
    copy_readable_steps, export_actions,
};

fn sample_actions() -> Vec<Action> {
    vec![
        Action::click("#start", Some("Start".into())),
        Action::input("#q", "rust"),
    ]
}

#[test]
fn test_json_is_two_space_indented() {
    let json = actions_to_json(&[Action::input("#q", "rust")]).unwrap();
    assert_eq!(
        json,
        "[\n  {\n    \"action\": \"input\",\n    \"selector\": \"#q\",\n    \"value\": \"rust\"\n  }\n]"
    );
}

#[tokio::test]
async fn test_directory_sink_writes_export() {
    let temp_dir = TempDir::new().unwrap();
    let out = temp_dir.path().join("exports");
    let mut sink = DirectorySink::new(&out);

    let outcome = export_actions(&sample_actions(), &mut sink).await.unwrap();
    let ExportOutcome::Exported { target, bytes } = outcome else {
        panic!("expected an export");
    };

    let path = out.join(EXPORT_FILENAME);
    assert_eq!(target, path.display().to_string());
    let written = tokio::fs::read_to_string(&path).await.unwrap();
    assert_eq!(written.len(), bytes);
    let decoded: Vec<Action> = serde_json::from_str(&written).unwrap();
    assert_eq!(decoded, sample_actions());
}

#[tokio::test]
async fn test_directory_sink_copy_writes_steps_file() {
    let temp_dir = TempDir::new().unwrap();
    let mut sink = DirectorySink::new(temp_dir.path());

    copy_readable_steps(&sample_actions(), &mut sink, &[])
        .await
        .unwrap();

    let text = tokio::fs::read_to_string(temp_dir.path().join(STEPS_FILENAME))
        .await
        .unwrap();
    assert_eq!(
        text,
        "1. Click on \"Start\"\n2. Enter \"rust\" into the Q field"
    );
}

#[tokio::test]
async fn test_empty_export_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let mut sink = DirectorySink::new(temp_dir.path());

    let outcome = export_actions(&[], &mut sink).await.unwrap();
    assert!(outcome.is_empty());
    assert!(!temp_dir.path().join(EXPORT_FILENAME).exists());

    let outcome = copy_readable_steps(&[], &mut sink, &[]).await.unwrap();
    assert_eq!(outcome, ExportOutcome::NoActions);
}
