//! CLI argument parsing types.
//!
//! This module provides the command-line interface structure for the
//! circleci-project binary.

mod files;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::client::DEFAULT_API_URL;
use crate::id::ProjectRef;

pub use files::{read_spec, read_state, record_apply, remove_state, write_state};

/// CircleCI project management command-line interface.
#[derive(Parser, Debug)]
#[command(name = "circleci-project", about = "Manage CircleCI projects", version)]
pub struct Cli {
    /// Output results as JSON instead of human-readable text.
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    /// Dump every HTTP request and response to stderr.
    #[arg(
        long,
        global = true,
        env = "CIRCLECI_DEBUG",
        value_parser = clap::builder::BoolishValueParser::new()
    )]
    pub debug: bool,

    /// CircleCI API token.
    #[arg(long, global = true, env = "CIRCLECI_API_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// CircleCI API base URL.
    #[arg(long, global = true, env = "CIRCLECI_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
///
/// Projects are addressed as `vcs_type:account:project`, e.g.
/// `github:acme:widgets`.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the projects you follow.
    Projects,

    /// Show a followed project.
    Get {
        /// Project id.
        id: ProjectRef,
    },

    /// Follow a project.
    Follow {
        /// Project id.
        id: ProjectRef,
    },

    /// Stop building a project.
    Disable {
        /// Project id.
        id: ProjectRef,
    },

    /// Manage project environment variables.
    Env {
        #[command(subcommand)]
        command: EnvCommand,
    },

    /// Manage project AWS keys.
    Aws {
        #[command(subcommand)]
        command: AwsCommand,
    },

    /// Show what `apply` would change, without calling the API.
    Plan {
        /// Desired project configuration (JSON).
        #[arg(long, short)]
        config: PathBuf,

        /// State file from a previous apply.
        #[arg(long, short)]
        state: Option<PathBuf>,
    },

    /// Bring a project to the desired configuration and record the result.
    Apply {
        /// Desired project configuration (JSON).
        #[arg(long, short)]
        config: PathBuf,

        /// State file to read and update.
        #[arg(long, short)]
        state: PathBuf,
    },

    /// Re-read a managed project and update its state file.
    Refresh {
        /// State file to read and update.
        #[arg(long, short)]
        state: PathBuf,
    },

    /// Start managing an existing project.
    Import {
        /// Project id.
        id: String,

        /// State file to write.
        #[arg(long, short)]
        state: PathBuf,
    },

    /// Disable a managed project and delete its state file.
    Destroy {
        /// State file of the managed project.
        #[arg(long, short)]
        state: PathBuf,
    },

    /// Print the masked form of a secret.
    Mask {
        /// Secret value.
        value: String,
    },
}

/// Environment variable commands.
#[derive(Subcommand, Debug)]
pub enum EnvCommand {
    /// List variables (values are masked by CircleCI).
    List {
        /// Project id.
        id: ProjectRef,
    },

    /// Add or overwrite a variable.
    Add {
        /// Project id.
        id: ProjectRef,

        /// Variable name.
        name: String,

        /// Variable value.
        value: String,
    },

    /// Delete a variable.
    Delete {
        /// Project id.
        id: ProjectRef,

        /// Variable name.
        name: String,
    },
}

/// AWS key commands.
#[derive(Subcommand, Debug)]
pub enum AwsCommand {
    /// Configure the project's AWS keypair.
    Set {
        /// Project id.
        id: ProjectRef,

        /// AWS access key id.
        #[arg(long, env = "AWS_ACCESS_KEY_ID")]
        access_key_id: String,

        /// AWS secret access key.
        #[arg(long, env = "AWS_SECRET_ACCESS_KEY", hide_env_values = true)]
        secret_access_key: String,
    },

    /// Remove the project's AWS keypair.
    Remove {
        /// Project id.
        id: ProjectRef,
    },
}
