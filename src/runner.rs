use anyhow::{Context, Result};
use declarative::{CommandOutput, CommandRunner};
use std::process::{Command, Stdio};

/// Runs commands on the local machine, capturing their output
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, cmd: &str, args: &[&str]) -> Result<CommandOutput> {
        log::trace!("exec: {} {}", cmd, args.join(" "));
        let output = Command::new(cmd)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .with_context(|| format!("Failed to execute: {} {}", cmd, args.join(" ")))?;
        Ok(output.into())
    }
}

/// Whether the process runs with root privileges
pub fn is_root() -> bool {
    // SAFETY: geteuid has no preconditions and cannot fail
    unsafe { libc::geteuid() == 0 }
}
