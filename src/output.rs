//! Output formatting for CLI display.
//!
//! Provides the [`PrettyPrint`] trait for human-readable output
//! as an alternative to JSON serialization.

use crate::{AwsChange, Plan, PlanAction, Project, ProjectState};

/// Trait for human-readable key-value output.
///
/// Implemented by entity types to provide formatted output
/// suitable for terminal display when `--json` is not specified.
pub trait PrettyPrint {
    /// Returns a formatted string for terminal display.
    fn pretty_print(&self) -> String;
}

fn header(title: &str) -> Vec<String> {
    vec![title.to_string(), "─".repeat(title.chars().count().max(30))]
}

impl PrettyPrint for Project {
    fn pretty_print(&self) -> String {
        let mut lines = header(&format!(
            "Project: {}/{}/{}",
            self.vcs_type, self.username, self.reponame
        ));

        match self.aws_keypair() {
            Some(kp) => {
                lines.push(format!("AWS Key ID:     {}", kp.access_key_id));
                lines.push(format!("AWS Secret:     {}", kp.secret_access_key));
            }
            None => lines.push("AWS Keys:       none".to_string()),
        }

        lines.join("\n")
    }
}

impl PrettyPrint for ProjectState {
    fn pretty_print(&self) -> String {
        let mut lines = header(&format!("Project: {}", self.id));

        if let Some(ref kp) = self.aws {
            lines.push(format!(
                "AWS Keys:       {} / {}",
                kp.access_key_id, kp.secret_access_key
            ));
        }

        if self.variable.is_empty() {
            lines.push("Variables:      none".to_string());
        } else {
            lines.push(format!("Variables:      {}", self.variable.len()));
            for var in &self.variable {
                lines.push(format!("  {} = {}", var.name, var.value));
            }
        }

        lines.join("\n")
    }
}

impl PrettyPrint for Plan {
    fn pretty_print(&self) -> String {
        let verb = match self.action {
            PlanAction::Create => "will be created",
            PlanAction::Replace => "must be replaced",
            PlanAction::Update => "will be updated in-place",
            PlanAction::NoOp => "is up to date",
        };
        let mut lines = header(&format!("Project {} {}", self.id, verb));

        for var in &self.variables.to_add {
            lines.push(format!("  + variable {}", var.name));
        }
        for name in &self.variables.to_remove {
            lines.push(format!("  - variable {}", name));
        }
        match &self.aws {
            AwsChange::Unchanged => {}
            AwsChange::Set(kp) => lines.push(format!("  ~ aws keys -> {}", kp.access_key_id)),
            AwsChange::Remove => lines.push("  - aws keys".to_string()),
        }

        lines.join("\n")
    }
}
