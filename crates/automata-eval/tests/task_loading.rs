use std::io::Write;

use automata_eval::{load_expected_actions, Action, EvalError, EvalTaskLoader, Role};
use serde_json::json;

fn write_temp(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn loads_tasks_with_transcripts_and_extra_fields() {
    let file = write_temp(
        r#"[
            {
                "task_id": "t1",
                "instructions": "find the docs",
                "difficulty": "easy",
                "transcript": [
                    {"role": "user", "content": "find the docs"},
                    {"role": "assistant", "function_call": {"name": "search", "arguments": "{\"q\": \"docs\"}"}}
                ]
            },
            {"task_id": "t2", "instructions": "nothing recorded"}
        ]"#,
    );

    let tasks = EvalTaskLoader::new(file.path()).load_tasks().unwrap();
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].extra["difficulty"], json!("easy"));

    let transcript = tasks[0].transcript.as_ref().unwrap();
    assert_eq!(transcript[1].role, Role::Assistant);
    let call = transcript[1].function_call.as_ref().unwrap();
    assert_eq!(call.parsed_arguments(), json!({"q": "docs"}));
    assert!(tasks[1].transcript.is_none());
}

#[test]
fn malformed_task_file_names_the_path() {
    let file = write_temp("[{\"task_id\": ");
    let err = EvalTaskLoader::new(file.path()).load_tasks().unwrap_err();
    match &err {
        EvalError::TaskLoad { path, .. } => assert_eq!(path, file.path()),
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains(&file.path().display().to_string()));
}

#[test]
fn missing_task_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = EvalTaskLoader::new(dir.path().join("absent.json"))
        .load_tasks()
        .unwrap_err();
    assert!(matches!(err, EvalError::Io(_)));
}

#[test]
fn loads_expected_actions_of_both_variants() {
    let file = write_temp(
        r#"[
            {"type": "function_call", "name": "search", "arguments": {"q": "docs"}},
            {"type": "code_block", "language": "python", "contains": "print("}
        ]"#,
    );
    let actions = load_expected_actions(file.path()).unwrap();
    assert_eq!(
        actions,
        vec![
            Action::function_call("search", json!({"q": "docs"})),
            Action::code_block(Some("python"), "print("),
        ]
    );
}
