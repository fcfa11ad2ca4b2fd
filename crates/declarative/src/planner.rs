//! Execution plan - an ordered list of provisioning steps

use crate::types::ProvisionStep;
use serde::{Deserialize, Serialize};

/// An ordered, named list of steps
///
/// Order is significant: steps are applied first to last and a failure
/// stops the run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionPlan {
    /// Name of the recipe that produced the plan
    pub name: String,
    /// Steps in application order
    pub steps: Vec<ProvisionStep>,
}

impl ExecutionPlan {
    /// Create a new empty plan
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
        }
    }

    /// Append a step
    pub fn push(&mut self, step: ProvisionStep) {
        self.steps.push(step);
    }

    /// Append every step of another plan, keeping this plan's name
    pub fn append(&mut self, other: ExecutionPlan) {
        self.steps.extend(other.steps);
    }

    pub fn steps(&self) -> &[ProvisionStep] {
        &self.steps
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProvisionStep> {
        self.steps.iter()
    }

    /// Position of the first step matching a predicate
    pub fn position<F>(&self, predicate: F) -> Option<usize>
    where
        F: Fn(&ProvisionStep) -> bool,
    {
        self.steps.iter().position(predicate)
    }

    /// Whether any step has the given kind
    pub fn contains_kind(&self, kind: &str) -> bool {
        self.steps.iter().any(|s| s.kind() == kind)
    }

    /// Filter plan to only include steps matching a predicate
    pub fn filter<F>(self, predicate: F) -> Self
    where
        F: Fn(&ProvisionStep) -> bool,
    {
        Self {
            name: self.name,
            steps: self.steps.into_iter().filter(|s| predicate(s)).collect(),
        }
    }

    /// Filter plan to only include steps matching a target pattern
    ///
    /// Target format: "kind" or "kind.name"
    pub fn filter_by_target(self, target: Option<&str>) -> Self {
        match target {
            None => self,
            Some(t) => {
                let (kind, name) = parse_target(t);
                self.filter(|s| matches_filter(s, kind.as_deref(), name.as_deref()))
            }
        }
    }

    /// Total number of steps in the plan
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Check if plan is empty
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Parse a target string like "kind.name" into (kind, name)
///
/// Only the first dot separates; names may contain dots (`libreoffice4.2-calc`).
fn parse_target(target: &str) -> (Option<String>, Option<String>) {
    match target.split_once('.') {
        None => (Some(target.to_string()), None),
        Some((kind, name)) if !kind.is_empty() => {
            (Some(kind.to_string()), Some(name.to_string()))
        }
        Some(_) => (None, Some(target.to_string())),
    }
}

/// Check if a step matches the filter criteria
fn matches_filter(step: &ProvisionStep, kind: Option<&str>, name: Option<&str>) -> bool {
    if let Some(k) = kind {
        // Allow common aliases
        let matches_kind = match k {
            "packages" | "package" => step.kind() == "ensure_package",
            "users" | "groups" | "accounts" => {
                matches!(step.kind(), "ensure_user" | "ensure_group")
            }
            "archives" => matches!(step.kind(), "download_archive" | "extract_archive"),
            "files" => matches!(
                step.kind(),
                "render_template" | "install_file" | "set_file_mode" | "set_ownership"
            ),
            "repos" => matches!(
                step.kind(),
                "build_local_package_repo" | "register_local_package_repository"
            ),
            "services" => step.kind() == "ensure_service_running",
            _ => step.kind() == k,
        };
        if !matches_kind {
            return false;
        }
    }

    if let Some(n) = name
        && !step.id().contains(n)
    {
        return false;
    }

    true
}
