//! Desired-state management of a `circleci_project` resource.
//!
//! A [`ProjectSpec`] describes what a project should look like; a
//! [`ProjectState`] records what was last observed. The [`Reconciler`] walks
//! a project from one to the other through the client operations, and
//! [`plan`] previews the changes without touching the network.

mod diff;
mod lifecycle;

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{CircleCiError, Result};
use crate::id::ProjectRef;
use crate::mask::masked_form;
use crate::models::{AwsKeypair, EnvVar, Project, VcsType};

pub use diff::{diff_aws, diff_variables, plan, AwsChange, Plan, PlanAction, VariableDiff};
pub use lifecycle::{ProjectApi, Reconciler};

/// Desired configuration of a project.
///
/// Secret values (`variable[].value`, `aws.secret_access_key`) are given in
/// plaintext.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSpec {
    /// Hosting platform; defaults to GitHub.
    #[serde(default)]
    pub vcs_type: VcsType,

    /// GitHub or Bitbucket organization that owns the repository.
    pub account: String,

    /// Repository name.
    pub project: String,

    /// Environment variables to set on the project.
    #[serde(default)]
    pub variable: Vec<EnvVar>,

    /// AWS keypair to configure, if any.
    #[serde(default)]
    pub aws: Option<AwsKeypair>,
}

impl ProjectSpec {
    pub fn new(vcs_type: VcsType, account: impl Into<String>, project: impl Into<String>) -> Self {
        Self {
            vcs_type,
            account: account.into(),
            project: project.into(),
            variable: Vec::new(),
            aws: None,
        }
    }

    /// Add an environment variable.
    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.variable.push(EnvVar::new(name, value));
        self
    }

    /// Configure an AWS keypair.
    pub fn with_aws(mut self, access_key_id: impl Into<String>, secret: impl Into<String>) -> Self {
        self.aws = Some(AwsKeypair::new(access_key_id, secret));
        self
    }

    /// The project this spec manages.
    pub fn project_ref(&self) -> ProjectRef {
        ProjectRef::new(self.vcs_type, &self.account, &self.project)
    }

    /// Check the spec before any request is made.
    ///
    /// # Errors
    ///
    /// Returns [`CircleCiError::InvalidConfig`] for empty identity fields,
    /// empty variable names or a variable name given twice.
    pub fn validate(&self) -> Result<()> {
        if self.account.is_empty() {
            return Err(CircleCiError::InvalidConfig("account must not be empty".to_string()));
        }
        if self.project.is_empty() {
            return Err(CircleCiError::InvalidConfig("project must not be empty".to_string()));
        }

        let mut seen = HashSet::new();
        for var in &self.variable {
            if var.name.is_empty() {
                return Err(CircleCiError::InvalidConfig(
                    "variable name must not be empty".to_string(),
                ));
            }
            if !seen.insert(var.name.as_str()) {
                return Err(CircleCiError::InvalidConfig(format!(
                    "variable '{}' is declared more than once",
                    var.name
                )));
            }
        }
        Ok(())
    }
}

/// Observed state of a managed project.
///
/// Secret values are always stored masked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectState {
    /// Colon-joined id, `vcs_type:account:project`.
    pub id: String,
    pub vcs_type: VcsType,
    pub account: String,
    pub project: String,
    /// Environment variables sorted by name.
    #[serde(default)]
    pub variable: Vec<EnvVar>,
    #[serde(default)]
    pub aws: Option<AwsKeypair>,
}

impl ProjectState {
    /// State of a project with nothing configured on it yet.
    pub(crate) fn empty(project: &ProjectRef) -> Self {
        Self {
            id: project.id(),
            vcs_type: project.vcs_type,
            account: project.account.clone(),
            project: project.reponame.clone(),
            variable: Vec::new(),
            aws: None,
        }
    }

    /// Build state from what the API returned.
    pub(crate) fn observed(project_ref: &ProjectRef, project: &Project, vars: Vec<EnvVar>) -> Self {
        let variable: BTreeMap<String, String> = vars
            .into_iter()
            .map(|v| {
                let value = masked_form(&v.value);
                (v.name, value)
            })
            .collect();

        Self {
            variable: variable
                .into_iter()
                .map(|(name, value)| EnvVar { name, value })
                .collect(),
            aws: project.aws_keypair().map(|kp| {
                AwsKeypair::new(&kp.access_key_id, masked_form(&kp.secret_access_key))
            }),
            ..Self::empty(project_ref)
        }
    }

    /// The project this state describes.
    pub fn project_ref(&self) -> ProjectRef {
        ProjectRef::new(self.vcs_type, &self.account, &self.project)
    }
}
