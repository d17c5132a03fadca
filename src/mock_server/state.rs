//! Mock server state management.
//!
//! Provides the in-memory data store for the mock CircleCI API server.
//! Secrets are stored in plaintext and masked on the way out, the way the
//! real service behaves.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::id::ProjectRef;
use crate::mask::mask_secret;
use crate::models::{AwsConfig, AwsKeypair, EnvVar, Project};

/// Why a mock operation could not be carried out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockError {
    ProjectNotFound(ProjectRef),
    EnvVarNotFound(String),
}

impl MockError {
    /// Message returned in the `{"message": ...}` body.
    pub fn message(&self) -> String {
        match self {
            Self::ProjectNotFound(project) => format!("Project not found: {project}"),
            Self::EnvVarNotFound(name) => format!("Environment variable not found: {name}"),
        }
    }
}

/// Shared state for the mock server.
///
/// It's wrapped in `Arc<RwLock<_>>` for concurrent access.
#[derive(Debug, Default)]
pub struct MockState {
    /// Followed projects in the order they were followed.
    pub projects: Vec<Project>,

    /// Plaintext environment variables per project.
    /// Survives disabling, like project settings on the real service.
    pub env_vars: HashMap<ProjectRef, BTreeMap<String, String>>,

    /// Optional authentication token. If set, requests must include this token.
    pub required_token: Option<String>,
}

impl MockState {
    /// Create a new empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create state wrapped in Arc<RwLock> for sharing.
    pub fn shared(self) -> Arc<RwLock<Self>> {
        Arc::new(RwLock::new(self))
    }

    /// Add a followed project to the state.
    pub fn with_project(mut self, project: Project) -> Self {
        self.projects.push(project);
        self
    }

    /// Add an environment variable (plaintext) to a project.
    pub fn with_env_var(mut self, project: &ProjectRef, name: &str, value: &str) -> Self {
        self.env_vars
            .entry(project.clone())
            .or_default()
            .insert(name.to_string(), value.to_string());
        self
    }

    /// Set the required authentication token.
    pub fn with_required_token(mut self, token: &str) -> Self {
        self.required_token = Some(token.to_string());
        self
    }

    /// Returns true if the request token is acceptable.
    pub fn authorized(&self, token: Option<&str>) -> bool {
        match &self.required_token {
            Some(required) => token == Some(required.as_str()),
            None => true,
        }
    }

    /// Get a followed project (secrets unmasked).
    pub fn get_project(&self, project: &ProjectRef) -> Option<&Project> {
        self.projects.iter().find(|p| p.matches(project))
    }

    /// A followed project as the API returns it.
    pub fn project_view(&self, project: &ProjectRef) -> Result<Project, MockError> {
        self.get_project(project)
            .map(masked_project)
            .ok_or_else(|| MockError::ProjectNotFound(project.clone()))
    }

    /// All followed projects as the API returns them.
    pub fn list_projects(&self) -> Vec<Project> {
        self.projects.iter().map(masked_project).collect()
    }

    /// Follow a project. Following twice is a no-op.
    pub fn follow(&mut self, project: &ProjectRef) -> Project {
        if self.get_project(project).is_none() {
            self.projects.push(Project {
                aws: AwsConfig::default(),
                username: project.account.clone(),
                reponame: project.reponame.clone(),
                vcs_type: project.vcs_type.to_string(),
            });
        }
        self.get_project(project).map(masked_project).unwrap_or_default()
    }

    /// Stop following a project.
    pub fn disable(&mut self, project: &ProjectRef) -> Result<(), MockError> {
        let before = self.projects.len();
        self.projects.retain(|p| !p.matches(project));
        if self.projects.len() == before {
            return Err(MockError::ProjectNotFound(project.clone()));
        }
        Ok(())
    }

    /// Replace a project's AWS keypair.
    pub fn set_aws(
        &mut self,
        project: &ProjectRef,
        keypair: Option<AwsKeypair>,
    ) -> Result<Project, MockError> {
        let stored = self
            .projects
            .iter_mut()
            .find(|p| p.matches(project))
            .ok_or_else(|| MockError::ProjectNotFound(project.clone()))?;
        stored.aws.keypair = keypair;
        Ok(masked_project(stored))
    }

    /// List a project's variables with masked values.
    pub fn list_env_vars(&self, project: &ProjectRef) -> Result<Vec<EnvVar>, MockError> {
        self.require_project(project)?;
        Ok(self
            .env_vars
            .get(project)
            .map(|vars| {
                vars.iter()
                    .map(|(name, value)| EnvVar::new(name, mask_secret(value)))
                    .collect()
            })
            .unwrap_or_default())
    }

    /// Add or overwrite a variable, returning it masked.
    pub fn add_env_var(&mut self, project: &ProjectRef, var: EnvVar) -> Result<EnvVar, MockError> {
        self.require_project(project)?;
        let masked = EnvVar::new(&var.name, mask_secret(&var.value));
        self.env_vars
            .entry(project.clone())
            .or_default()
            .insert(var.name, var.value);
        Ok(masked)
    }

    /// Delete a variable by name.
    pub fn delete_env_var(&mut self, project: &ProjectRef, name: &str) -> Result<(), MockError> {
        self.require_project(project)?;
        self.env_vars
            .get_mut(project)
            .and_then(|vars| vars.remove(name))
            .map(|_| ())
            .ok_or_else(|| MockError::EnvVarNotFound(name.to_string()))
    }

    /// Plaintext value of a variable, for assertions in tests.
    pub fn env_var_value(&self, project: &ProjectRef, name: &str) -> Option<&str> {
        self.env_vars.get(project)?.get(name).map(String::as_str)
    }

    fn require_project(&self, project: &ProjectRef) -> Result<(), MockError> {
        self.project_view(project).map(|_| ())
    }
}

fn masked_project(project: &Project) -> Project {
    let mut masked = project.clone();
    if let Some(keypair) = masked.aws.keypair.as_mut() {
        keypair.secret_access_key = mask_secret(&keypair.secret_access_key);
    }
    masked
}
