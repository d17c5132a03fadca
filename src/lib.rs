//! CircleCI project management library.
//!
//! A Rust library for managing CircleCI projects through the v1.1 REST API:
//! following and disabling projects, configuring AWS keys and managing
//! project environment variables. On top of the raw client sits a
//! desired-state [`Reconciler`] for a `circleci_project` resource.
//!
//! # Quick Start
//!
//! ```no_run
//! use circleci_project::{CircleCiClient, ProjectRef};
//!
//! #[tokio::main]
//! async fn main() -> circleci_project::Result<()> {
//!     // Create client from environment variables
//!     let client = CircleCiClient::from_env()?;
//!
//!     // List followed projects
//!     let projects = client.list_projects().await?;
//!     println!("Following {} projects", projects.len());
//!
//!     // Look one up by its id
//!     let widgets: ProjectRef = "github:acme:widgets".parse()?;
//!     let project = client.get_project(&widgets).await?;
//!     println!("Found {}/{}", project.username, project.reponame);
//!
//!     // Environment variable values come back masked
//!     for var in client.list_env_vars(&widgets).await? {
//!         println!("{} = {}", var.name, var.value);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - [`CircleCiClient`] - authenticated HTTP client with typed operations
//! - [`mask_secret`] - partial redaction of secrets recorded in state
//! - [`ProjectRef`], [`build_id`], [`expand_id`] - project identifiers
//! - [`Reconciler`] - create/read/update/delete/import of a project resource
//!
//! # Configuration
//!
//! The client reads configuration from environment variables:
//!
//! - `CIRCLECI_API_TOKEN` (required) - Your CircleCI API token
//! - `CIRCLECI_API_URL` (optional) - Base URL (defaults to `https://circleci.com/api/v1.1/`)
//! - `CIRCLECI_DEBUG` (optional) - Set to `1` to dump requests and responses

pub mod cli;
mod client;
mod error;
mod id;
mod logger;
mod mask;
mod models;
mod output;
mod resource;

#[cfg(feature = "test-server")]
pub mod mock_server;

// Re-export core types
pub use client::{CircleCiClient, ClientBuilder, DEFAULT_API_URL};
pub use error::{ApiError, CircleCiError, Result};
pub use logger::{DebugLogger, TracingLogger, HTTP_LOG_TARGET};

// Re-export identifiers and masking
pub use id::{build_id, expand_id, ProjectRef};
pub use mask::{is_masked, mask_secret, masked_form, MASK_PREFIX};

// Re-export models
pub use models::{AwsConfig, AwsKeypair, EnvVar, Project, VcsType};

// Re-export resource management
pub use resource::{
    diff_aws, diff_variables, plan, AwsChange, Plan, PlanAction, ProjectApi, ProjectSpec,
    ProjectState, Reconciler, VariableDiff,
};

pub use output::PrettyPrint;
