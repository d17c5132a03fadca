//! Project model and project-level operations.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::client::CircleCiClient;
use crate::error::{CircleCiError, Result};
use crate::id::ProjectRef;

/// Hosting platform of a project's repository.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VcsType {
    #[default]
    Github,
    Bitbucket,
}

impl VcsType {
    /// The name used in API paths and ids.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Github => "github",
            Self::Bitbucket => "bitbucket",
        }
    }
}

impl fmt::Display for VcsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VcsType {
    type Err = CircleCiError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "github" => Ok(Self::Github),
            "bitbucket" => Ok(Self::Bitbucket),
            other => Err(CircleCiError::InvalidVcsType(other.to_string())),
        }
    }
}

/// A CircleCI project as returned by the v1.1 API.
///
/// Every field defaults when absent or null: the follow endpoint answers
/// with a sparse body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// AWS settings for the project.
    #[serde(default, deserialize_with = "null_as_default")]
    pub aws: AwsConfig,

    /// Account (organization) that owns the repository.
    #[serde(default, deserialize_with = "null_as_default")]
    pub username: String,

    /// Repository name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub reponame: String,

    /// VCS type as reported by the server (e.g. "github").
    #[serde(default, deserialize_with = "null_as_default")]
    pub vcs_type: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> core::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// AWS configuration of a project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwsConfig {
    /// The keypair, or `None` when no keys are configured.
    #[serde(default)]
    pub keypair: Option<AwsKeypair>,
}

/// AWS access key pair.
///
/// When read from the API the secret key is masked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwsKeypair {
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl AwsKeypair {
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
        }
    }
}

/// Body of `PUT project/.../settings`.
///
/// Only the AWS keypair is sent; `null` removes the keys.
#[derive(Debug, Serialize)]
struct SettingsUpdate<'a> {
    aws: AwsSettings<'a>,
}

#[derive(Debug, Serialize)]
struct AwsSettings<'a> {
    keypair: Option<&'a AwsKeypair>,
}

impl Project {
    /// Returns true if this project is the one addressed by `project`.
    pub fn matches(&self, project: &ProjectRef) -> bool {
        self.vcs_type == project.vcs_type.as_str()
            && self.username == project.account
            && self.reponame == project.reponame
    }

    /// The reference for this project, if the server's vcs type is known.
    pub fn project_ref(&self) -> Option<ProjectRef> {
        let vcs_type = self.vcs_type.parse().ok()?;
        Some(ProjectRef::new(vcs_type, &self.username, &self.reponame))
    }

    /// The configured AWS keypair, if any.
    pub fn aws_keypair(&self) -> Option<&AwsKeypair> {
        self.aws.keypair.as_ref()
    }
}

impl CircleCiClient {
    /// List the projects the token's user follows, in server order.
    #[tracing::instrument(skip(self))]
    pub async fn list_projects(&self) -> Result<Vec<Project>> {
        self.get("projects").await
    }

    /// Look up a single followed project.
    ///
    /// There is no single-project endpoint in v1.1, so this scans
    /// [`list_projects`](Self::list_projects) for the first match.
    ///
    /// # Errors
    ///
    /// Returns [`CircleCiError::NotFound`] if the project is not followed.
    #[tracing::instrument(skip(self))]
    pub async fn get_project(&self, project: &ProjectRef) -> Result<Project> {
        let projects = self.list_projects().await?;

        projects
            .into_iter()
            .find(|p| p.matches(project))
            .ok_or_else(|| CircleCiError::NotFound {
                vcs_type: project.vcs_type.to_string(),
                account: project.account.clone(),
                reponame: project.reponame.clone(),
            })
    }

    /// Follow a project, enabling builds for it.
    #[tracing::instrument(skip(self))]
    pub async fn follow_project(&self, project: &ProjectRef) -> Result<Project> {
        self.post_empty(&project.api_path("follow")).await
    }

    /// Stop building a project.
    #[tracing::instrument(skip(self))]
    pub async fn disable_project(&self, project: &ProjectRef) -> Result<()> {
        self.delete(&project.api_path("enable")).await
    }

    /// Configure the project's AWS keypair.
    #[tracing::instrument(skip(self, secret_access_key))]
    pub async fn set_aws_keys(
        &self,
        project: &ProjectRef,
        access_key_id: &str,
        secret_access_key: &str,
    ) -> Result<()> {
        let keypair = AwsKeypair::new(access_key_id, secret_access_key);
        let body = SettingsUpdate {
            aws: AwsSettings {
                keypair: Some(&keypair),
            },
        };
        self.put(&project.api_path("settings"), &body).await
    }

    /// Remove the project's AWS keypair.
    #[tracing::instrument(skip(self))]
    pub async fn remove_aws_keys(&self, project: &ProjectRef) -> Result<()> {
        let body = SettingsUpdate {
            aws: AwsSettings { keypair: None },
        };
        self.put(&project.api_path("settings"), &body).await
    }
}
