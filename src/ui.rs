use colored::{ColoredString, Colorize};
use declarative::{ApplyResult, ExecuteSummary};

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", "ℹ".blue(), msg);
}

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a warning message
pub fn warn(msg: &str) {
    println!("{} {}", "⚠".yellow(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a dim/muted message
pub fn dim(msg: &str) {
    println!("  {}", msg.dimmed());
}

/// Print a header/title
pub fn header(title: &str) {
    println!();
    println!("{}", title.bold());
    println!("{}", "─".repeat(title.chars().count()).dimmed());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

/// Print a step indicator
pub fn step(num: usize, total: usize, msg: &str) {
    println!("{} {}", format!("[{num}/{total}]").blue().bold(), msg);
}

/// Colored status symbol for a step result
pub fn result_symbol(result: &ApplyResult) -> ColoredString {
    let symbol = result.symbol();
    match result {
        ApplyResult::NoChange => symbol.dimmed(),
        ApplyResult::Created => symbol.green(),
        ApplyResult::Modified => symbol.yellow(),
        ApplyResult::Skipped { .. } => symbol.blue(),
        ApplyResult::Failed { .. } => symbol.red(),
    }
}

/// Short trailing detail for a step result
pub fn result_detail(result: &ApplyResult) -> String {
    match result {
        ApplyResult::NoChange => "(ok)".dimmed().to_string(),
        ApplyResult::Created => "(created)".green().to_string(),
        ApplyResult::Modified => "(updated)".yellow().to_string(),
        ApplyResult::Skipped { reason } => format!("({reason})").blue().to_string(),
        ApplyResult::Failed { error } => error.red().to_string(),
    }
}

/// One-line summary of a run
pub fn summary_line(summary: &ExecuteSummary) -> String {
    let mut parts = vec![
        format!("{} created", summary.created),
        format!("{} updated", summary.modified),
        format!("{} unchanged", summary.no_change),
    ];
    if summary.skipped > 0 {
        parts.push(format!("{} skipped", summary.skipped));
    }
    if summary.failed > 0 {
        parts.push(format!("{} failed", summary.failed));
    }
    if summary.not_attempted > 0 {
        parts.push(format!("{} not attempted", summary.not_attempted));
    }
    parts.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_line_minimal() {
        let summary = ExecuteSummary {
            created: 2,
            no_change: 3,
            ..Default::default()
        };
        assert_eq!(summary_line(&summary), "2 created, 0 updated, 3 unchanged");
    }

    #[test]
    fn test_summary_line_with_failure() {
        let summary = ExecuteSummary {
            created: 1,
            failed: 1,
            not_attempted: 4,
            ..Default::default()
        };
        assert_eq!(
            summary_line(&summary),
            "1 created, 0 updated, 0 unchanged, 1 failed, 4 not attempted"
        );
    }

    #[test]
    fn test_result_detail_mentions_reason() {
        colored::control::set_override(false);
        let detail = result_detail(&ApplyResult::Skipped {
            reason: "Dry run".into(),
        });
        assert_eq!(detail, "(Dry run)");
    }
}
