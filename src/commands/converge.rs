//! `converge` - apply a recipe to this host

use anyhow::{Context as AnyhowContext, Result};
use colored::Colorize;
use declarative::{
    ApplyResult, AutoConfirm, ConfirmCallback, ExecuteOptions, RunReport, execute,
};

use crate::Context;
use crate::cli::ConvergeArgs;
use crate::engine::HostApplier;
use crate::progress::{Spinner, StepPrinter};
use crate::runner::{self, SystemRunner};
use crate::ui;

/// Asks on the terminal before anything changes
struct TerminalConfirm;

impl ConfirmCallback for TerminalConfirm {
    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(true)
            .interact()?;
        Ok(confirmed)
    }
}

pub fn run(ctx: &Context, args: ConvergeArgs) -> Result<()> {
    let target = super::load_target(ctx)?;
    let plan = args
        .recipe
        .plan(&target.node, target.platform_family)
        .with_context(|| format!("Could not plan recipe {}", args.recipe))?;

    if !args.dry_run && !runner::is_root() {
        ui::warn("Not running as root; most steps will fail");
    }

    if !ctx.quiet {
        ui::header(&format!("Converge {}", plan.name));
        ui::kv("platform", target.platform_family.name());
        ui::kv("steps", &plan.len().to_string());
        println!();
    }

    let opts = ExecuteOptions {
        dry_run: args.dry_run,
    };
    let mut applier = HostApplier::new(SystemRunner, target.platform_family);

    let report = if args.dry_run {
        execute(&plan, &opts, &mut applier, &mut StepPrinter, &mut AutoConfirm)?
    } else if args.yes {
        execute(
            &plan,
            &opts,
            &mut applier,
            &mut Spinner::default(),
            &mut AutoConfirm,
        )?
    } else {
        execute(
            &plan,
            &opts,
            &mut applier,
            &mut Spinner::default(),
            &mut TerminalConfirm,
        )?
    };

    finish(&report, args.dry_run)
}

fn declined(report: &RunReport) -> bool {
    !report.steps.is_empty()
        && report.steps.iter().all(|s| {
            matches!(&s.result, ApplyResult::Skipped { reason } if reason == "Declined")
        })
}

fn finish(report: &RunReport, dry_run: bool) -> Result<()> {
    let summary = report.summary();
    println!();

    if declined(report) {
        println!("  {} Aborted", "✗".red());
        return Ok(());
    }

    if let Some(failure) = &report.failure {
        ui::error(&format!(
            "Step {} ({}) failed: {}",
            failure.index + 1,
            failure.step,
            failure.message
        ));
        ui::dim(&ui::summary_line(&summary));
        report.clone().into_result()?;
        return Ok(());
    }

    if dry_run {
        ui::info(&format!("Dry run - no changes made ({})", ui::summary_line(&summary)));
    } else if summary.total_changes() == 0 {
        ui::success("Host already converged");
    } else {
        ui::success(&ui::summary_line(&summary));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use declarative::{StepFailure, StepReport};

    fn report(results: Vec<ApplyResult>) -> RunReport {
        RunReport {
            planned: results.len(),
            steps: results
                .into_iter()
                .enumerate()
                .map(|(index, result)| StepReport {
                    index,
                    step: format!("ensure_package:{index}"),
                    result,
                })
                .collect(),
            failure: None,
        }
    }

    #[test]
    fn test_declined_detection() {
        let skipped = ApplyResult::Skipped {
            reason: "Declined".into(),
        };
        assert!(declined(&report(vec![skipped.clone(), skipped])));
        assert!(!declined(&report(vec![ApplyResult::Created])));
        assert!(!declined(&report(Vec::new())));
    }

    #[test]
    fn test_finish_fails_on_step_failure() {
        let mut run = report(vec![
            ApplyResult::Created,
            ApplyResult::Failed {
                error: "yum exploded".into(),
            },
        ]);
        run.planned = 5;
        run.failure = Some(StepFailure {
            index: 1,
            step: "ensure_package:1".into(),
            message: "yum exploded".into(),
        });
        let err = finish(&run, false).unwrap_err();
        assert!(err.to_string().contains("yum exploded"));
    }

    #[test]
    fn test_finish_ok_on_success() {
        assert!(finish(&report(vec![ApplyResult::NoChange]), false).is_ok());
    }
}
