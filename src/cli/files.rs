//! Desired-configuration and state files used by the CLI.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::{CircleCiError, Result};
use crate::resource::{ProjectSpec, ProjectState};

/// Read a desired project configuration.
pub fn read_spec(path: &Path) -> Result<ProjectSpec> {
    let contents = fs::read_to_string(path)?;
    let spec: ProjectSpec = serde_json::from_str(&contents)?;
    spec.validate()?;
    Ok(spec)
}

/// Read a state file. A missing file means nothing is managed yet.
pub fn read_state(path: &Path) -> Result<Option<ProjectState>> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(Some(serde_json::from_str(&contents)?)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Write a state file.
///
/// The file is written next to its destination and renamed into place, so
/// an interrupted write never leaves a truncated state file behind.
pub fn write_state(path: &Path, state: &ProjectState) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut contents = serde_json::to_string_pretty(state)?;
    contents.push('\n');

    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, contents)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&tmp_path, fs::Permissions::from_mode(0o600))?;
    }

    fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Delete a state file if it exists.
pub fn remove_state(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Record the outcome of an apply in the state file.
///
/// An apply that failed after changing the remote project still records
/// what was observed, or removes the file if nothing is managed any more.
/// The underlying error is returned in that case.
pub fn record_apply(path: &Path, outcome: Result<ProjectState>) -> Result<ProjectState> {
    match outcome {
        Ok(state) => {
            write_state(path, &state)?;
            Ok(state)
        }
        Err(CircleCiError::Incomplete { state, source }) => {
            match state {
                Some(observed) => write_state(path, &observed)?,
                None => remove_state(path)?,
            }
            Err(*source)
        }
        Err(e) => Err(e),
    }
}
