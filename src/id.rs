//! Project identifiers.
//!
//! A project is addressed by the triple (vcs type, account, repository).
//! Outside the client the triple travels as a single colon-joined string,
//! e.g. `github:acme:widgets`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CircleCiError, Result};
use crate::models::VcsType;

const DELIMITER: char = ':';

/// Join three parts into an id of the form `a:b:c`.
pub fn build_id(a: &str, b: &str, c: &str) -> String {
    format!("{a}{DELIMITER}{b}{DELIMITER}{c}")
}

/// Split an id of the form `a:b:c` into its three parts.
///
/// Only the first two colons delimit; the last part may itself contain
/// colons.
///
/// # Errors
///
/// Returns [`CircleCiError::InvalidId`] if the id has fewer than three parts.
pub fn expand_id(id: &str) -> Result<(String, String, String)> {
    let mut parts = id.splitn(3, DELIMITER);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(a), Some(b), Some(c)) => Ok((a.to_string(), b.to_string(), c.to_string())),
        _ => Err(CircleCiError::InvalidId(id.to_string())),
    }
}

/// The natural key of a CircleCI project.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectRef {
    /// Hosting platform of the repository.
    pub vcs_type: VcsType,
    /// Organization or user that owns the repository.
    pub account: String,
    /// Repository name.
    pub reponame: String,
}

impl ProjectRef {
    /// Create a reference from its parts.
    pub fn new(vcs_type: VcsType, account: impl Into<String>, reponame: impl Into<String>) -> Self {
        Self {
            vcs_type,
            account: account.into(),
            reponame: reponame.into(),
        }
    }

    /// Shorthand for a GitHub project.
    pub fn github(account: impl Into<String>, reponame: impl Into<String>) -> Self {
        Self::new(VcsType::Github, account, reponame)
    }

    /// The colon-joined id for this project.
    pub fn id(&self) -> String {
        build_id(self.vcs_type.as_str(), &self.account, &self.reponame)
    }

    /// API path for this project, percent-encoding the caller-supplied parts.
    pub(crate) fn api_path(&self, suffix: &str) -> String {
        format!(
            "project/{}/{}/{}/{}",
            self.vcs_type,
            urlencoding::encode(&self.account),
            urlencoding::encode(&self.reponame),
            suffix
        )
    }
}

impl fmt::Display for ProjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id())
    }
}

impl FromStr for ProjectRef {
    type Err = CircleCiError;

    fn from_str(id: &str) -> Result<Self> {
        let (vcs_type, account, reponame) = expand_id(id)?;
        Ok(Self {
            vcs_type: vcs_type.parse()?,
            account,
            reponame,
        })
    }
}
