//! Execution engine - applies plan steps strictly in order

use crate::context::{ConfirmCallback, ProgressCallback, StepApplier};
use crate::error::Error;
use crate::planner::ExecutionPlan;
use crate::types::{ApplyResult, ExecuteOptions, ExecuteSummary, ProvisionStep};
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Outcome of a single attempted step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepReport {
    pub index: usize,
    /// Qualified step id (`kind:id`)
    pub step: String,
    pub result: ApplyResult,
}

/// The step that halted a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepFailure {
    pub index: usize,
    pub step: String,
    pub message: String,
}

/// Result of running a plan
///
/// A run either completes every step or stops at the first failure;
/// there is no partial-success model and nothing is rolled back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// Number of steps in the plan
    pub planned: usize,
    /// Attempted steps, in order
    pub steps: Vec<StepReport>,
    /// The first failure, if any
    pub failure: Option<StepFailure>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    /// Steps that were never attempted
    pub fn not_attempted(&self) -> usize {
        self.planned.saturating_sub(self.steps.len())
    }

    pub fn summary(&self) -> ExecuteSummary {
        let mut summary = ExecuteSummary::default();
        for report in &self.steps {
            summary.add_result(&report.result);
        }
        summary.not_attempted = self.not_attempted();
        summary
    }

    /// Convert into the run's overall result
    pub fn into_result(self) -> crate::error::Result<ExecuteSummary> {
        let summary = self.summary();
        match self.failure {
            None => Ok(summary),
            Some(failure) => Err(Error::StepExecutionFailure {
                index: failure.index,
                step: failure.step,
                message: failure.message,
            }),
        }
    }
}

/// Execute a plan with the given applier and callbacks
///
/// # Type Parameters
/// * `A` - Step applier
/// * `P` - Progress callback type
/// * `C` - Confirm callback type
///
/// # Arguments
/// * `plan` - The execution plan to run
/// * `opts` - Execution options (dry_run)
/// * `applier` - Applies each step to the host
/// * `progress` - Progress callback
/// * `confirm` - Confirmation callback, consulted once before any change
///
/// # Returns
/// A report of every attempted step. Step failures are reported in the
/// report, not as `Err`; `Err` is reserved for failures of the callbacks.
pub fn execute<A, P, C>(
    plan: &ExecutionPlan,
    opts: &ExecuteOptions,
    applier: &mut A,
    progress: &mut P,
    confirm: &mut C,
) -> Result<RunReport>
where
    A: StepApplier,
    P: ProgressCallback,
    C: ConfirmCallback,
{
    let mut report = RunReport {
        planned: plan.len(),
        ..Default::default()
    };

    if plan.is_empty() {
        return Ok(report);
    }

    // Confirm before proceeding (unless dry_run)
    if !opts.dry_run && !confirm.confirm(&format!("Apply {} steps?", plan.len()))? {
        log::info!("Run of '{}' declined", plan.name);
        report.steps = plan
            .iter()
            .enumerate()
            .map(|(index, step)| StepReport {
                index,
                step: step.qualified_id(),
                result: ApplyResult::Skipped {
                    reason: "Declined".into(),
                },
            })
            .collect();
        return Ok(report);
    }

    progress.on_plan_start(plan.len());

    for (index, step) in plan.iter().enumerate() {
        progress.on_step_start(index, step);
        let result = apply_step(applier, step, opts.dry_run);
        progress.on_step_complete(index, step, &result);

        if let ApplyResult::Failed { error } = &result {
            log::error!("{} failed: {}", step.qualified_id(), error);
            report.failure = Some(StepFailure {
                index,
                step: step.qualified_id(),
                message: error.clone(),
            });
        }

        report.steps.push(StepReport {
            index,
            step: step.qualified_id(),
            result,
        });

        if report.failure.is_some() {
            break;
        }
    }

    progress.on_plan_complete();

    Ok(report)
}

/// Apply a single step, folding errors into a failed result
fn apply_step<A: StepApplier>(applier: &mut A, step: &ProvisionStep, dry_run: bool) -> ApplyResult {
    let outcome = if dry_run {
        applier.preview(step)
    } else {
        applier.apply(step)
    };

    match outcome {
        Ok(result) => {
            log::debug!("{} -> {:?}", step.qualified_id(), result);
            result
        }
        Err(e) => ApplyResult::Failed {
            error: format!("{e:#}"),
        },
    }
}

/// Simple execution without callbacks
///
/// For basic use cases where you don't need progress or confirmation.
pub fn execute_simple<A: StepApplier>(
    plan: &ExecutionPlan,
    opts: &ExecuteOptions,
    applier: &mut A,
) -> Result<RunReport> {
    use crate::context::{AutoConfirm, NoProgress};

    execute(plan, opts, applier, &mut NoProgress, &mut AutoConfirm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{AutoConfirm, AutoDecline, DryRun, NoProgress};

    /// Applier that records what it was asked to do and fails on one id
    struct RecordingApplier {
        applied: Vec<String>,
        fail_on: Option<String>,
    }

    impl RecordingApplier {
        fn new(fail_on: Option<&str>) -> Self {
            Self {
                applied: Vec::new(),
                fail_on: fail_on.map(String::from),
            }
        }
    }

    impl StepApplier for RecordingApplier {
        fn apply(&mut self, step: &ProvisionStep) -> Result<ApplyResult> {
            self.applied.push(step.id());
            if self.fail_on.as_deref() == Some(step.id().as_str()) {
                anyhow::bail!("No package {} available", step.id());
            }
            Ok(ApplyResult::Created)
        }
    }

    fn plan_of(names: &[&str]) -> ExecutionPlan {
        let mut plan = ExecutionPlan::new("test");
        for name in names {
            plan.push(ProvisionStep::package(*name));
        }
        plan
    }

    #[test]
    fn test_execute_empty_plan() {
        let mut applier = RecordingApplier::new(None);
        let report = execute(
            &ExecutionPlan::new("empty"),
            &ExecuteOptions::default(),
            &mut applier,
            &mut NoProgress,
            &mut AutoConfirm,
        )
        .unwrap();

        assert_eq!(report.summary().total(), 0);
        assert!(report.is_success());
    }

    #[test]
    fn test_execute_applies_in_order() {
        let mut applier = RecordingApplier::new(None);
        let report =
            execute_simple(&plan_of(&["unzip", "curl", "git"]), &ExecuteOptions::default(), &mut applier)
                .unwrap();

        assert_eq!(applier.applied, ["unzip", "curl", "git"]);
        assert_eq!(report.summary().created, 3);
        assert!(report.into_result().is_ok());
    }

    #[test]
    fn test_execute_halts_on_first_failure() {
        let mut applier = RecordingApplier::new(Some("curl"));
        let report =
            execute_simple(&plan_of(&["unzip", "curl", "git"]), &ExecuteOptions::default(), &mut applier)
                .unwrap();

        assert_eq!(applier.applied, ["unzip", "curl"]);
        assert_eq!(report.steps.len(), 2);
        assert_eq!(report.not_attempted(), 1);

        let summary = report.summary();
        assert_eq!(summary.created, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.not_attempted, 1);

        match report.into_result() {
            Err(Error::StepExecutionFailure {
                index,
                step,
                message,
            }) => {
                assert_eq!(index, 1);
                assert_eq!(step, "ensure_package:curl");
                assert!(message.contains("No package curl available"));
            }
            other => panic!("Expected StepExecutionFailure, got {other:?}"),
        }
    }

    #[test]
    fn test_failed_result_without_error_also_halts() {
        struct FailingResult;
        impl StepApplier for FailingResult {
            fn apply(&mut self, _step: &ProvisionStep) -> Result<ApplyResult> {
                Ok(ApplyResult::Failed {
                    error: "exit status 1".into(),
                })
            }
        }

        let report =
            execute_simple(&plan_of(&["a", "b"]), &ExecuteOptions::default(), &mut FailingResult)
                .unwrap();
        assert_eq!(report.steps.len(), 1);
        assert_eq!(report.failure.map(|f| f.index), Some(0));
    }

    #[test]
    fn test_dry_run_uses_preview() {
        let mut applier = RecordingApplier::new(Some("unzip"));
        let report = execute_simple(
            &plan_of(&["unzip", "curl"]),
            &ExecuteOptions { dry_run: true },
            &mut applier,
        )
        .unwrap();

        assert!(applier.applied.is_empty());
        assert_eq!(report.summary().skipped, 2);
        assert!(report.is_success());
    }

    #[test]
    fn test_declined_run_skips_everything() {
        let mut applier = RecordingApplier::new(None);
        let report = execute(
            &plan_of(&["unzip", "curl"]),
            &ExecuteOptions::default(),
            &mut applier,
            &mut NoProgress,
            &mut AutoDecline,
        )
        .unwrap();

        assert!(applier.applied.is_empty());
        assert_eq!(report.summary().skipped, 2);
    }

    #[test]
    fn test_dry_run_applier() {
        let report =
            execute_simple(&plan_of(&["unzip"]), &ExecuteOptions::default(), &mut DryRun).unwrap();
        assert_eq!(report.summary().skipped, 1);
    }
}
