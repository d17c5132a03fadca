//! CLI argument parsing tests.

use std::path::PathBuf;

use circleci_project::cli::{AwsCommand, Cli, Command, EnvCommand};
use circleci_project::{ProjectRef, VcsType, DEFAULT_API_URL};
use clap::Parser;

#[test]
fn test_cli_parses_get_subcommand() {
    let cli = Cli::parse_from(["circleci-project", "get", "github:acme:widgets"]);

    assert!(!cli.json);
    match cli.command {
        Command::Get { id } => {
            assert_eq!(id, ProjectRef::github("acme", "widgets"));
        }
        _ => panic!("Expected Get command"),
    }
}

#[test]
fn test_cli_rejects_malformed_id() {
    let result = Cli::try_parse_from(["circleci-project", "get", "acme/widgets"]);
    assert!(result.is_err());
}

#[test]
fn test_cli_rejects_unknown_vcs_type() {
    let result = Cli::try_parse_from(["circleci-project", "follow", "gitlab:acme:widgets"]);
    assert!(result.is_err());
}

#[test]
fn test_cli_parses_env_add() {
    let cli = Cli::parse_from([
        "circleci-project",
        "env",
        "add",
        "bitbucket:acme:widgets",
        "API_TOKEN",
        "s3cret",
    ]);

    match cli.command {
        Command::Env {
            command: EnvCommand::Add { id, name, value },
        } => {
            assert_eq!(id.vcs_type, VcsType::Bitbucket);
            assert_eq!(name, "API_TOKEN");
            assert_eq!(value, "s3cret");
        }
        _ => panic!("Expected env add command"),
    }
}

#[test]
fn test_cli_parses_aws_set() {
    let cli = Cli::parse_from([
        "circleci-project",
        "aws",
        "set",
        "github:acme:widgets",
        "--access-key-id",
        "AKIA",
        "--secret-access-key",
        "secret",
    ]);

    match cli.command {
        Command::Aws {
            command:
                AwsCommand::Set {
                    access_key_id,
                    secret_access_key,
                    ..
                },
        } => {
            assert_eq!(access_key_id, "AKIA");
            assert_eq!(secret_access_key, "secret");
        }
        _ => panic!("Expected aws set command"),
    }
}

#[test]
fn test_cli_parses_plan_with_optional_state() {
    let cli = Cli::parse_from(["circleci-project", "plan", "--config", "project.json"]);

    match cli.command {
        Command::Plan { config, state } => {
            assert_eq!(config, PathBuf::from("project.json"));
            assert!(state.is_none());
        }
        _ => panic!("Expected Plan command"),
    }
}

#[test]
fn test_cli_apply_requires_state() {
    let result = Cli::try_parse_from(["circleci-project", "apply", "--config", "project.json"]);
    assert!(result.is_err());
}

#[test]
fn test_cli_import_keeps_raw_id() {
    let cli = Cli::parse_from([
        "circleci-project",
        "import",
        "github:acme:widgets",
        "--state",
        "state.json",
    ]);

    match cli.command {
        Command::Import { id, state } => {
            assert_eq!(id, "github:acme:widgets");
            assert_eq!(state, PathBuf::from("state.json"));
        }
        _ => panic!("Expected Import command"),
    }
}

#[test]
fn test_global_json_flag() {
    // --json before subcommand
    let cli = Cli::parse_from(["circleci-project", "--json", "projects"]);
    assert!(cli.json);

    // --json after subcommand (global flag)
    let cli = Cli::parse_from(["circleci-project", "projects", "--json"]);
    assert!(cli.json);
}

#[test]
fn test_api_url_flag() {
    let cli = Cli::parse_from([
        "circleci-project",
        "--api-url",
        "http://localhost:8080/api/v1.1/",
        "projects",
    ]);
    assert_eq!(cli.api_url, "http://localhost:8080/api/v1.1/");

    if std::env::var_os("CIRCLECI_API_URL").is_none() {
        let cli = Cli::parse_from(["circleci-project", "projects"]);
        assert_eq!(cli.api_url, DEFAULT_API_URL);
    }
}

#[test]
fn test_mask_subcommand() {
    let cli = Cli::parse_from(["circleci-project", "mask", "hunter22"]);
    assert!(matches!(cli.command, Command::Mask { value } if value == "hunter22"));
}
