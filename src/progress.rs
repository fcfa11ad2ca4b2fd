//! Progress reporting for converge runs

use colored::Colorize;
use declarative::{ApplyResult, ProgressCallback, ProvisionStep};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::ui;

/// Spinner for the step in flight, with one line per finished step
#[derive(Default)]
pub struct Spinner {
    bar: Option<ProgressBar>,
    total: usize,
}

impl Spinner {
    fn style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {prefix:.bold.dim} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }
}

impl ProgressCallback for Spinner {
    fn on_plan_start(&mut self, total: usize) {
        self.total = total;
        let bar = ProgressBar::new_spinner();
        bar.set_style(Self::style());
        bar.enable_steady_tick(Duration::from_millis(100));
        self.bar = Some(bar);
    }

    fn on_step_start(&mut self, index: usize, step: &ProvisionStep) {
        if let Some(bar) = &self.bar {
            bar.set_prefix(format!("[{}/{}]", index + 1, self.total));
            bar.set_message(step.description());
        }
    }

    fn on_step_complete(&mut self, _index: usize, step: &ProvisionStep, result: &ApplyResult) {
        let line = format!(
            "  {} {} {}",
            ui::result_symbol(result),
            step.description(),
            ui::result_detail(result)
        );
        match &self.bar {
            Some(bar) => bar.println(line),
            None => println!("{line}"),
        }
    }

    fn on_plan_complete(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}

/// Plain line-per-step output, used for dry runs where steps print their own diffs
pub struct StepPrinter;

impl ProgressCallback for StepPrinter {
    fn on_plan_start(&mut self, total: usize) {
        println!("  {} Previewing {} steps", "→".cyan(), total);
    }

    fn on_step_start(&mut self, _index: usize, _step: &ProvisionStep) {}

    fn on_step_complete(&mut self, _index: usize, step: &ProvisionStep, result: &ApplyResult) {
        println!(
            "  {} {} {}",
            ui::result_symbol(result),
            step.description(),
            ui::result_detail(result)
        );
    }

    fn on_plan_complete(&mut self) {}
}
