//! Environment variable model and operations.

use serde::{Deserialize, Serialize};

use crate::client::CircleCiClient;
use crate::error::Result;
use crate::id::ProjectRef;

/// A project-scoped environment variable.
///
/// Values returned by the API are masked by the server; the client passes
/// them through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvVar {
    pub name: String,
    pub value: String,
}

impl EnvVar {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl CircleCiClient {
    /// List a project's environment variables (values masked).
    #[tracing::instrument(skip(self))]
    pub async fn list_env_vars(&self, project: &ProjectRef) -> Result<Vec<EnvVar>> {
        self.get(&project.api_path("envvar")).await
    }

    /// Add (or overwrite) an environment variable.
    ///
    /// Returns the stored variable with its value masked by the server.
    #[tracing::instrument(skip(self, value))]
    pub async fn add_env_var(&self, project: &ProjectRef, name: &str, value: &str) -> Result<EnvVar> {
        let body = EnvVar::new(name, value);
        self.post(&project.api_path("envvar"), &body).await
    }

    /// Delete an environment variable by name.
    #[tracing::instrument(skip(self))]
    pub async fn delete_env_var(&self, project: &ProjectRef, name: &str) -> Result<()> {
        let path = project.api_path(&format!("envvar/{}", urlencoding::encode(name)));
        self.delete(&path).await
    }
}
