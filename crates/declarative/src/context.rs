//! Applier, runner and callback traits
//!
//! These traits let the declarative crate drive execution without
//! depending on how steps touch the host, how progress is shown, or
//! how the operator is asked for confirmation.

use crate::types::{ApplyResult, CommandOutput, ProvisionStep};
use anyhow::Result;

/// Applies a single provisioning step to a host
///
/// Implementations must make `apply` idempotent: re-applying a step on a
/// converged host returns [`ApplyResult::NoChange`] or
/// [`ApplyResult::Skipped`].
pub trait StepApplier {
    /// Converge the host for this step
    fn apply(&mut self, step: &ProvisionStep) -> Result<ApplyResult>;

    /// Describe what `apply` would do without touching the host
    fn preview(&mut self, step: &ProvisionStep) -> Result<ApplyResult> {
        log::debug!("dry run: {}", step.description());
        Ok(ApplyResult::Skipped {
            reason: "Dry run".into(),
        })
    }
}

/// Applier that never changes anything
pub struct DryRun;

impl StepApplier for DryRun {
    fn apply(&mut self, step: &ProvisionStep) -> Result<ApplyResult> {
        self.preview(step)
    }
}

/// Runs external commands
///
/// Implement this trait to execute commands on a host. Tests substitute
/// a recording runner.
pub trait CommandRunner {
    /// Run a command and collect its output
    fn run(&self, cmd: &str, args: &[&str]) -> Result<CommandOutput>;

    /// Run a command and return just success/failure
    fn run_status(&self, cmd: &str, args: &[&str]) -> Result<bool> {
        Ok(self.run(cmd, args)?.success)
    }

    /// Run a command and capture stdout, failing on a non-zero exit
    fn run_capture(&self, cmd: &str, args: &[&str]) -> Result<String> {
        let output = self.run(cmd, args)?;
        if !output.success {
            anyhow::bail!(
                "Command failed: {} {}: {}",
                cmd,
                args.join(" "),
                output.stderr_str().trim()
            );
        }
        Ok(output.stdout_str())
    }

    /// Run a command, failing on a non-zero exit
    fn run_checked(&self, cmd: &str, args: &[&str]) -> Result<()> {
        self.run_capture(cmd, args).map(|_| ())
    }
}

/// Progress callback for execution operations
pub trait ProgressCallback {
    /// Called once before the first step
    fn on_plan_start(&mut self, total: usize);

    /// Called when starting to apply a single step
    fn on_step_start(&mut self, index: usize, step: &ProvisionStep);

    /// Called when a step completes, successfully or not
    fn on_step_complete(&mut self, index: usize, step: &ProvisionStep, result: &ApplyResult);

    /// Called once after the last attempted step
    fn on_plan_complete(&mut self);
}

/// Confirmation callback for user interaction
pub trait ConfirmCallback {
    /// Ask the user to confirm an action
    ///
    /// # Returns
    /// `true` if the user confirmed, `false` otherwise
    fn confirm(&mut self, prompt: &str) -> Result<bool>;
}

/// No-op progress callback
pub struct NoProgress;

impl ProgressCallback for NoProgress {
    fn on_plan_start(&mut self, _total: usize) {}
    fn on_step_start(&mut self, _index: usize, _step: &ProvisionStep) {}
    fn on_step_complete(&mut self, _index: usize, _step: &ProvisionStep, _result: &ApplyResult) {}
    fn on_plan_complete(&mut self) {}
}

/// Auto-confirm callback (always returns true)
pub struct AutoConfirm;

impl ConfirmCallback for AutoConfirm {
    fn confirm(&mut self, _prompt: &str) -> Result<bool> {
        Ok(true)
    }
}

/// Auto-decline callback (always returns false)
pub struct AutoDecline;

impl ConfirmCallback for AutoDecline {
    fn confirm(&mut self, _prompt: &str) -> Result<bool> {
        Ok(false)
    }
}
