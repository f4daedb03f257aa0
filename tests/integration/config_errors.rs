// tests/config_errors.rs

use std::io::Write;
use tempfile::NamedTempFile;
use runwatch::config::load_and_validate;
use runwatch::errors::RunnerError;
use runwatch::protocol::CONFIRM_SENTINEL;
use runwatch::types::AnswerPolicy;

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn test_full_config_loads() {
    let file = config_file(
        r#"
[service]
connect_timeout_ms = 2500

[confirm]
policy = "no"

[project.cell]
name = "Assembly cell"
api_url = "http://localhost:8000"
sim_url = "https://sim.local"
dsl_path = "flows/cell.dsl"

[project.cell.dsl_config]
task = "fasten"
"#,
    );

    let cfg = load_and_validate(file.path()).unwrap();
    assert_eq!(cfg.service.connect_timeout_ms, Some(2500));
    assert_eq!(cfg.confirm.policy, AnswerPolicy::No);
    assert_eq!(cfg.protocol.sentinel_prefix, CONFIRM_SENTINEL);
    assert_eq!(cfg.sole_project(), Some("cell"));

    let project = &cfg.project["cell"];
    assert_eq!(project.name.as_deref(), Some("Assembly cell"));
    assert_eq!(
        project.dsl_config.as_ref().and_then(|v| v.get("task")),
        Some(&serde_json::json!("fasten"))
    );
}

#[test]
fn test_missing_projects_returns_config_error() {
    let file = config_file(
        r#"
[confirm]
policy = "ask"
"#,
    );

    match load_and_validate(file.path()) {
        Err(RunnerError::Config(msg)) => {
            assert!(msg.contains("at least one [project.<id>] section"));
        }
        Err(e) => panic!("Expected Config error, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_invalid_url_returns_config_error() {
    let file = config_file(
        r#"
[project.cell]
api_url = "http://localhost:8000"
sim_url = "localhost:8080"
"#,
    );

    match load_and_validate(file.path()) {
        Err(RunnerError::Config(msg)) => {
            assert!(msg.contains("'cell'"));
            assert!(msg.contains("`sim_url`"));
        }
        Err(e) => panic!("Expected Config error, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_empty_url_returns_config_error() {
    let file = config_file(
        r#"
[project.cell]
api_url = "  "
sim_url = "http://localhost:8080"
"#,
    );

    let err = load_and_validate(file.path()).unwrap_err();
    assert!(matches!(err, RunnerError::Config(ref m) if m.contains("is missing `api_url`")));
}

#[test]
fn test_zero_connect_timeout_is_rejected() {
    let file = config_file(
        r#"
[service]
connect_timeout_ms = 0

[project.cell]
api_url = "http://localhost:8000"
sim_url = "http://localhost:8080"
"#,
    );

    let err = load_and_validate(file.path()).unwrap_err();
    assert!(matches!(err, RunnerError::Config(ref m) if m.contains("connect_timeout_ms")));
}

#[test]
fn test_empty_sentinel_prefix_is_rejected() {
    let file = config_file(
        r#"
[protocol]
sentinel_prefix = ""

[project.cell]
api_url = "http://localhost:8000"
sim_url = "http://localhost:8080"
"#,
    );

    let err = load_and_validate(file.path()).unwrap_err();
    assert!(matches!(err, RunnerError::Config(ref m) if m.contains("sentinel_prefix")));
}

#[test]
fn test_unknown_policy_is_a_toml_error() {
    let file = config_file(
        r#"
[confirm]
policy = "sometimes"

[project.cell]
api_url = "http://localhost:8000"
sim_url = "http://localhost:8080"
"#,
    );

    assert!(matches!(
        load_and_validate(file.path()),
        Err(RunnerError::Toml(_))
    ));
}

#[test]
fn test_missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("Runwatch.toml");
    assert!(matches!(load_and_validate(&missing), Err(RunnerError::Io(_))));
}
