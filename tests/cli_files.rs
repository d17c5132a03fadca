//! Configuration and state file handling used by the CLI.

use std::fs;

use circleci_project::cli::{read_spec, read_state, remove_state, write_state};
use circleci_project::{CircleCiError, EnvVar, ProjectState, VcsType};

#[test]
fn test_read_spec_defaults_vcs_type() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("project.json");
    fs::write(
        &path,
        r#"{
            "account": "acme",
            "project": "widgets",
            "variable": [{"name": "API_TOKEN", "value": "s3cret"}]
        }"#,
    )
    .unwrap();

    let spec = read_spec(&path).unwrap();
    assert_eq!(spec.vcs_type, VcsType::Github);
    assert_eq!(spec.variable, vec![EnvVar::new("API_TOKEN", "s3cret")]);
    assert!(spec.aws.is_none());
}

#[test]
fn test_read_spec_rejects_bad_vcs_type() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("project.json");
    fs::write(
        &path,
        r#"{"vcs_type": "gitlab", "account": "acme", "project": "widgets"}"#,
    )
    .unwrap();

    assert!(matches!(read_spec(&path), Err(CircleCiError::ParseError(_))));
}

#[test]
fn test_read_spec_validates() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("project.json");
    fs::write(&path, r#"{"account": "", "project": "widgets"}"#).unwrap();

    assert!(matches!(read_spec(&path), Err(CircleCiError::InvalidConfig(_))));
}

#[test]
fn test_missing_state_file_is_none() {
    let dir = tempfile::tempdir().unwrap();
    let state = read_state(&dir.path().join("absent.json")).unwrap();
    assert!(state.is_none());
}

#[test]
fn test_state_file_round_trip_and_remove() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    let state = ProjectState {
        id: "github:acme:widgets".to_string(),
        vcs_type: VcsType::Github,
        account: "acme".to_string(),
        project: "widgets".to_string(),
        variable: vec![EnvVar::new("API_TOKEN", "xxxxcret")],
        aws: None,
    };

    write_state(&path, &state).unwrap();
    let written = fs::read_to_string(&path).unwrap();
    assert!(written.contains("\"xxxxcret\""));
    assert_eq!(read_state(&path).unwrap(), Some(state));

    remove_state(&path).unwrap();
    assert!(!path.exists());
    // Removing twice is fine
    remove_state(&path).unwrap();
}
