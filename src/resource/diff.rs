//! Offline comparison of observed and desired project state.

use std::collections::BTreeMap;

use serde::{Serialize, Serializer};

use super::{ProjectSpec, ProjectState};
use crate::mask::masked_form;
use crate::models::{AwsKeypair, EnvVar};

/// Variable changes needed to go from one set to another.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VariableDiff {
    /// Variables to create or overwrite, with their desired values.
    /// Serialized masked.
    #[serde(serialize_with = "masked_vars")]
    pub to_add: Vec<EnvVar>,
    /// Names of variables to delete.
    pub to_remove: Vec<String>,
}

impl VariableDiff {
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

/// Compare variable sets keyed by name.
///
/// Values are compared in masked form, since `prior` usually holds what the
/// server echoed back. A changed value shows up only in `to_add`: adding a
/// variable that already exists overwrites it.
pub fn diff_variables(prior: &[EnvVar], desired: &[EnvVar]) -> VariableDiff {
    let prior: BTreeMap<&str, String> = prior
        .iter()
        .map(|v| (v.name.as_str(), masked_form(&v.value)))
        .collect();
    let desired: BTreeMap<&str, &EnvVar> = desired.iter().map(|v| (v.name.as_str(), v)).collect();

    let to_add = desired
        .iter()
        .filter(|(name, var)| prior.get(*name) != Some(&masked_form(&var.value)))
        .map(|(_, var)| (*var).clone())
        .collect();

    let to_remove = prior
        .keys()
        .filter(|name| !desired.contains_key(*name))
        .map(|name| name.to_string())
        .collect();

    VariableDiff { to_add, to_remove }
}

/// What to do with a project's AWS keypair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum AwsChange {
    Unchanged,
    Set(#[serde(serialize_with = "masked_keypair")] AwsKeypair),
    Remove,
}

#[allow(clippy::ptr_arg)]
fn masked_vars<S: Serializer>(vars: &Vec<EnvVar>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(vars.iter().map(|v| EnvVar::new(&v.name, masked_form(&v.value))))
}

fn masked_keypair<S: Serializer>(keypair: &AwsKeypair, serializer: S) -> Result<S::Ok, S::Error> {
    AwsKeypair::new(&keypair.access_key_id, masked_form(&keypair.secret_access_key))
        .serialize(serializer)
}

/// Compare the observed keypair (masked secret) with the desired one.
pub fn diff_aws(prior: Option<&AwsKeypair>, desired: Option<&AwsKeypair>) -> AwsChange {
    match (prior, desired) {
        (None, None) => AwsChange::Unchanged,
        (Some(_), None) => AwsChange::Remove,
        (None, Some(want)) => AwsChange::Set(want.clone()),
        (Some(have), Some(want)) => {
            let same = have.access_key_id == want.access_key_id
                && masked_form(&have.secret_access_key) == masked_form(&want.secret_access_key);
            if same {
                AwsChange::Unchanged
            } else {
                AwsChange::Set(want.clone())
            }
        }
    }
}

/// Top-level action a plan calls for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanAction {
    /// No prior state: follow the project.
    Create,
    /// Identity changed: disable the old project, follow the new one.
    Replace,
    /// Same project, settings differ.
    Update,
    NoOp,
}

/// Changes [`Reconciler::apply`](super::Reconciler::apply) would make.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Plan {
    pub action: PlanAction,
    /// Id of the project the plan ends up managing.
    pub id: String,
    pub variables: VariableDiff,
    pub aws: AwsChange,
}

/// Preview the changes needed to reach `desired` from `prior`.
pub fn plan(prior: Option<&ProjectState>, desired: &ProjectSpec) -> Plan {
    let target = desired.project_ref();

    let (action, base) = match prior {
        None => (PlanAction::Create, None),
        Some(state) if state.project_ref() != target => (PlanAction::Replace, None),
        Some(state) => (PlanAction::Update, Some(state)),
    };

    let prior_vars = base.map(|s| s.variable.as_slice()).unwrap_or_default();
    let prior_aws = base.and_then(|s| s.aws.as_ref());

    let variables = diff_variables(prior_vars, &desired.variable);
    let aws = diff_aws(prior_aws, desired.aws.as_ref());

    let action = if action == PlanAction::Update && variables.is_empty() && aws == AwsChange::Unchanged {
        PlanAction::NoOp
    } else {
        action
    };

    Plan {
        action,
        id: target.id(),
        variables,
        aws,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mask::mask_secret;
    use crate::models::VcsType;

    fn var(name: &str, value: &str) -> EnvVar {
        EnvVar::new(name, value)
    }

    fn state_with(vars: Vec<EnvVar>, aws: Option<AwsKeypair>) -> ProjectState {
        ProjectState {
            id: "github:acme:widgets".to_string(),
            vcs_type: VcsType::Github,
            account: "acme".to_string(),
            project: "widgets".to_string(),
            variable: vars,
            aws,
        }
    }

    #[test]
    fn test_diff_adds_and_removes() {
        let prior = vec![var("KEEP", &mask_secret("same-value")), var("GONE", "xxxxabcd")];
        let desired = vec![var("KEEP", "same-value"), var("NEW", "fresh")];

        let diff = diff_variables(&prior, &desired);

        assert_eq!(diff.to_add, vec![var("NEW", "fresh")]);
        assert_eq!(diff.to_remove, vec!["GONE".to_string()]);
    }

    #[test]
    fn test_changed_value_is_overwrite_not_delete() {
        let prior = vec![var("TOKEN", &mask_secret("old-token-1111"))];
        let desired = vec![var("TOKEN", "new-token-2222")];

        let diff = diff_variables(&prior, &desired);

        assert_eq!(diff.to_add, vec![var("TOKEN", "new-token-2222")]);
        assert!(diff.to_remove.is_empty());
    }

    #[test]
    fn test_same_suffix_is_not_detected() {
        // Only the masked form is known for prior values
        let prior = vec![var("TOKEN", &mask_secret("aaaa-9999"))];
        let desired = vec![var("TOKEN", "bbbb-9999")];

        assert!(diff_variables(&prior, &desired).is_empty());
    }

    #[test]
    fn test_plaintext_with_mask_prefix_is_always_re_added() {
        // The server echoes xxxxhello as xxxxello, which never matches
        let prior = vec![var("A", &mask_secret("xxxxhello"))];
        let desired = vec![var("A", "xxxxhello")];

        let diff = diff_variables(&prior, &desired);

        assert_eq!(diff.to_add, vec![var("A", "xxxxhello")]);
        assert!(diff.to_remove.is_empty());
    }

    #[test]
    fn test_diff_is_symmetric_on_names() {
        let a = vec![var("A", "1"), var("B", "2")];
        let b = vec![var("B", "2"), var("C", "3")];

        let forward = diff_variables(&a, &b);
        let backward = diff_variables(&b, &a);

        assert_eq!(forward.to_remove, vec!["A".to_string()]);
        assert_eq!(backward.to_remove, vec!["C".to_string()]);
        assert_eq!(forward.to_add, vec![var("C", "3")]);
        assert_eq!(backward.to_add, vec![var("A", "1")]);
    }

    #[test]
    fn test_diff_aws() {
        let have = AwsKeypair::new("AKIA1", mask_secret("secret-one"));

        assert_eq!(diff_aws(None, None), AwsChange::Unchanged);
        assert_eq!(diff_aws(Some(&have), None), AwsChange::Remove);
        assert_eq!(
            diff_aws(Some(&have), Some(&AwsKeypair::new("AKIA1", "secret-one"))),
            AwsChange::Unchanged
        );

        let rotated = AwsKeypair::new("AKIA1", "secret-two");
        assert_eq!(diff_aws(Some(&have), Some(&rotated)), AwsChange::Set(rotated.clone()));

        let new_key = AwsKeypair::new("AKIA2", "secret-one");
        assert_eq!(diff_aws(Some(&have), Some(&new_key)), AwsChange::Set(new_key.clone()));
        assert_eq!(diff_aws(None, Some(&new_key)), AwsChange::Set(new_key));
    }

    #[test]
    fn test_plan_create() {
        let spec = ProjectSpec::new(VcsType::Github, "acme", "widgets").with_variable("A", "1");
        let plan = plan(None, &spec);

        assert_eq!(plan.action, PlanAction::Create);
        assert_eq!(plan.id, "github:acme:widgets");
        assert_eq!(plan.variables.to_add.len(), 1);
    }

    #[test]
    fn test_plan_noop_and_update() {
        let state = state_with(vec![var("A", &mask_secret("value-a"))], None);

        let spec = ProjectSpec::new(VcsType::Github, "acme", "widgets").with_variable("A", "value-a");
        assert_eq!(plan(Some(&state), &spec).action, PlanAction::NoOp);

        let spec = spec.with_aws("AKIA", "secret");
        let update = plan(Some(&state), &spec);
        assert_eq!(update.action, PlanAction::Update);
        assert!(matches!(update.aws, AwsChange::Set(_)));
    }

    #[test]
    fn test_plan_replace_ignores_prior_settings() {
        let state = state_with(vec![var("A", "xxxxa")], None);
        let spec = ProjectSpec::new(VcsType::Bitbucket, "acme", "widgets").with_variable("A", "aa");

        let plan = plan(Some(&state), &spec);

        assert_eq!(plan.action, PlanAction::Replace);
        assert_eq!(plan.id, "bitbucket:acme:widgets");
        assert_eq!(plan.variables.to_add, vec![var("A", "aa")]);
    }

    #[test]
    fn test_plan_serializes() {
        let spec = ProjectSpec::new(VcsType::Github, "acme", "widgets");
        let value = serde_json::to_value(plan(None, &spec)).unwrap();
        assert_eq!(value["action"], "create");
        assert_eq!(value["aws"]["action"], "unchanged");
    }

    #[test]
    fn test_plan_serializes_masked_secrets() {
        let spec = ProjectSpec::new(VcsType::Github, "acme", "widgets")
            .with_variable("TOKEN", "tok_0123456789")
            .with_aws("AKIA", "wJalrXUtnFEMIK7MDENG");

        let value = serde_json::to_value(plan(None, &spec)).unwrap();

        assert_eq!(value["variables"]["to_add"][0]["value"], "xxxx6789");
        assert_eq!(value["aws"]["action"], "set");
        assert_eq!(value["aws"]["access_key_id"], "AKIA");
        assert_eq!(value["aws"]["secret_access_key"], "xxxxDENG");
    }
}
