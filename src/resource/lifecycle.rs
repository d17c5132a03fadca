//! Create/read/update/delete of a project resource.

use async_trait::async_trait;

use super::diff::{diff_aws, diff_variables, AwsChange};
use super::{ProjectSpec, ProjectState};
use crate::client::CircleCiClient;
use crate::error::{CircleCiError, Result};
use crate::id::ProjectRef;
use crate::models::{EnvVar, Project};

/// The API operations the reconciler drives.
///
/// [`CircleCiClient`] is the production implementation.
#[async_trait]
pub trait ProjectApi: Send + Sync {
    async fn get_project(&self, project: &ProjectRef) -> Result<Project>;

    async fn follow_project(&self, project: &ProjectRef) -> Result<Project>;

    async fn disable_project(&self, project: &ProjectRef) -> Result<()>;

    async fn set_aws_keys(
        &self,
        project: &ProjectRef,
        access_key_id: &str,
        secret_access_key: &str,
    ) -> Result<()>;

    async fn remove_aws_keys(&self, project: &ProjectRef) -> Result<()>;

    async fn list_env_vars(&self, project: &ProjectRef) -> Result<Vec<EnvVar>>;

    async fn add_env_var(&self, project: &ProjectRef, name: &str, value: &str) -> Result<EnvVar>;

    async fn delete_env_var(&self, project: &ProjectRef, name: &str) -> Result<()>;
}

#[async_trait]
impl ProjectApi for CircleCiClient {
    async fn get_project(&self, project: &ProjectRef) -> Result<Project> {
        CircleCiClient::get_project(self, project).await
    }

    async fn follow_project(&self, project: &ProjectRef) -> Result<Project> {
        CircleCiClient::follow_project(self, project).await
    }

    async fn disable_project(&self, project: &ProjectRef) -> Result<()> {
        CircleCiClient::disable_project(self, project).await
    }

    async fn set_aws_keys(
        &self,
        project: &ProjectRef,
        access_key_id: &str,
        secret_access_key: &str,
    ) -> Result<()> {
        CircleCiClient::set_aws_keys(self, project, access_key_id, secret_access_key).await
    }

    async fn remove_aws_keys(&self, project: &ProjectRef) -> Result<()> {
        CircleCiClient::remove_aws_keys(self, project).await
    }

    async fn list_env_vars(&self, project: &ProjectRef) -> Result<Vec<EnvVar>> {
        CircleCiClient::list_env_vars(self, project).await
    }

    async fn add_env_var(&self, project: &ProjectRef, name: &str, value: &str) -> Result<EnvVar> {
        CircleCiClient::add_env_var(self, project, name, value).await
    }

    async fn delete_env_var(&self, project: &ProjectRef, name: &str) -> Result<()> {
        CircleCiClient::delete_env_var(self, project, name).await
    }
}

/// Drives projects toward their desired configuration.
///
/// # Example
///
/// ```no_run
/// use circleci_project::{CircleCiClient, ProjectSpec, Reconciler, VcsType};
///
/// # async fn example() -> circleci_project::Result<()> {
/// let reconciler = Reconciler::new(CircleCiClient::from_env()?);
///
/// let spec = ProjectSpec::new(VcsType::Github, "acme", "widgets")
///     .with_variable("DEPLOY_ENV", "staging");
/// let state = reconciler.apply(None, &spec).await?;
/// println!("managing {}", state.id);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Reconciler<A> {
    api: A,
}

impl<A: ProjectApi> Reconciler<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    /// The API the reconciler talks to.
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Bring a project from `prior` (if any) to `spec`.
    ///
    /// A change of vcs type, account or project name replaces the resource:
    /// the old project is disabled before the new one is followed.
    ///
    /// # Errors
    ///
    /// A failure after the old project was disabled is reported as
    /// [`CircleCiError::Incomplete`], carrying the new project's state if it
    /// got followed.
    pub async fn apply(&self, prior: Option<&ProjectState>, spec: &ProjectSpec) -> Result<ProjectState> {
        spec.validate()?;

        match prior {
            None => self.create(spec).await,
            Some(state) if state.project_ref() != spec.project_ref() => {
                tracing::debug!(from = %state.id, to = %spec.project_ref(), "Replacing project");
                self.delete(&state.project_ref()).await?;
                self.create(spec).await.map_err(|e| match e {
                    CircleCiError::Incomplete { .. } => e,
                    e => CircleCiError::Incomplete {
                        state: None,
                        source: Box::new(e),
                    },
                })
            }
            Some(state) => self.update(state, spec).await,
        }
    }

    /// Follow a project and configure it.
    ///
    /// # Errors
    ///
    /// Once the project is followed, a failure is reported as
    /// [`CircleCiError::Incomplete`] with the project's observed state.
    pub async fn create(&self, spec: &ProjectSpec) -> Result<ProjectState> {
        spec.validate()?;
        let project = spec.project_ref();

        tracing::debug!(
            "Following {}/{} {} project on CircleCI",
            project.account,
            project.reponame,
            project.vcs_type
        );

        self.api
            .follow_project(&project)
            .await
            .map_err(|e| e.context("error following project"))?;

        self.update(&ProjectState::empty(&project), spec).await
    }

    /// Observe a project's current configuration.
    ///
    /// Returns `Ok(None)` if the project is no longer followed, meaning the
    /// resource is gone.
    pub async fn read(&self, project: &ProjectRef) -> Result<Option<ProjectState>> {
        let id = project.id();

        let remote = match self.api.get_project(project).await {
            Ok(remote) => remote,
            Err(e) if e.is_not_found() => {
                tracing::warn!(%id, "CircleCI project is no longer followed");
                return Ok(None);
            }
            Err(e) => return Err(e.context(format!("Error reading CircleCI project \"{id}\""))),
        };

        let vars = self
            .api
            .list_env_vars(project)
            .await
            .map_err(|e| e.context("Error setting environment"))?;

        Ok(Some(ProjectState::observed(project, &remote, vars)))
    }

    /// Apply variable and AWS changes, then re-read the project.
    ///
    /// # Errors
    ///
    /// Returns [`CircleCiError::InvalidConfig`] if `spec` addresses a
    /// different project than `prior`; use [`apply`](Self::apply) to replace.
    pub async fn update(&self, prior: &ProjectState, spec: &ProjectSpec) -> Result<ProjectState> {
        spec.validate()?;
        let project = prior.project_ref();
        if project != spec.project_ref() {
            return Err(CircleCiError::InvalidConfig(format!(
                "{} cannot be updated in place to {}",
                project,
                spec.project_ref()
            )));
        }

        if let Err(e) = self.change(&project, prior, spec).await {
            return Err(self.settle(&project, prior, e).await);
        }

        self.read(&project).await?.ok_or_else(|| CircleCiError::NotFound {
            vcs_type: project.vcs_type.to_string(),
            account: project.account.clone(),
            reponame: project.reponame.clone(),
        })
    }

    /// Push variable and AWS differences to the API.
    async fn change(&self, project: &ProjectRef, prior: &ProjectState, spec: &ProjectSpec) -> Result<()> {
        let variables = diff_variables(&prior.variable, &spec.variable);

        for var in &variables.to_add {
            tracing::debug!(name = %var.name, "Setting environment variable");
            self.api
                .add_env_var(project, &var.name, &var.value)
                .await
                .map_err(|e| e.context(format!("error adding variable {}", var.name)))?;
        }

        for name in &variables.to_remove {
            tracing::debug!(%name, "Deleting environment variable");
            self.api
                .delete_env_var(project, name)
                .await
                .map_err(|e| e.context(format!("error deleting variable {name}")))?;
        }

        match diff_aws(prior.aws.as_ref(), spec.aws.as_ref()) {
            AwsChange::Unchanged => {}
            AwsChange::Set(keypair) => {
                tracing::debug!(access_key_id = %keypair.access_key_id, "Setting AWS keys");
                self.api
                    .set_aws_keys(project, &keypair.access_key_id, &keypair.secret_access_key)
                    .await
                    .map_err(|e| e.context("error setting AWS keys"))?;
            }
            AwsChange::Remove => {
                tracing::debug!("Removing AWS keys");
                self.api
                    .remove_aws_keys(project)
                    .await
                    .map_err(|e| e.context("error removing AWS keys"))?;
            }
        }

        Ok(())
    }

    /// Turn a failed change into [`CircleCiError::Incomplete`], re-reading
    /// the project so the caller can record what actually happened.
    async fn settle(&self, project: &ProjectRef, prior: &ProjectState, error: CircleCiError) -> CircleCiError {
        let state = match self.read(project).await {
            Ok(observed) => observed,
            Err(e) => {
                tracing::warn!(%project, error = %e, "Unable to re-read project after a failed change");
                Some(prior.clone())
            }
        };

        CircleCiError::Incomplete {
            state: state.map(Box::new),
            source: Box::new(error),
        }
    }

    /// Stop building a project.
    pub async fn delete(&self, project: &ProjectRef) -> Result<()> {
        self.api
            .disable_project(project)
            .await
            .map_err(|e| e.context(format!("Error disabling project \"{project}\"")))
    }

    /// Start managing an existing project by id.
    ///
    /// # Errors
    ///
    /// Fails if the id is malformed or the project is not followed.
    pub async fn import(&self, id: &str) -> Result<ProjectState> {
        let project: ProjectRef = id.parse()?;
        self.read(&project).await?.ok_or_else(|| {
            CircleCiError::NotFound {
                vcs_type: project.vcs_type.to_string(),
                account: project.account.clone(),
                reponame: project.reponame.clone(),
            }
            .context(format!("Cannot import \"{id}\""))
        })
    }
}
