//! # Declarative
//!
//! Declarative provisioning: describe the desired state of a host as an
//! ordered list of idempotent steps, then apply them one at a time.
//!
//! ## Core Concepts
//!
//! - **ProvisionStep**: One idempotent unit of desired state (a package, a
//!   user, a rendered file, a running service)
//! - **ExecutionPlan**: An ordered, named list of steps
//! - **StepApplier**: Knows how to converge a host for a single step
//! - **Executor**: Applies a plan strictly in order and stops at the first
//!   failure
//!
//! ## Example
//!
//! ```
//! use declarative::{
//!     ApplyResult, ExecuteOptions, ExecutionPlan, ProvisionStep, StepApplier, execute_simple,
//! };
//!
//! struct Echo;
//!
//! impl StepApplier for Echo {
//!     fn apply(&mut self, step: &ProvisionStep) -> anyhow::Result<ApplyResult> {
//!         println!("would apply {}", step);
//!         Ok(ApplyResult::NoChange)
//!     }
//! }
//!
//! let mut plan = ExecutionPlan::new("tools");
//! plan.push(ProvisionStep::package("unzip"));
//! plan.push(ProvisionStep::package("curl"));
//!
//! let report = execute_simple(&plan, &ExecuteOptions::default(), &mut Echo)?;
//! assert!(report.is_success());
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## Provider Traits
//!
//! The crate uses traits for dependency injection:
//!
//! - [`StepApplier`]: Converges the host for one step
//! - [`CommandRunner`]: Runs external commands for an applier
//! - [`ProgressCallback`]: Receives progress updates
//! - [`ConfirmCallback`]: Handles user confirmations
//!
//! This allows the crate to be used without hard dependencies on
//! specific UI frameworks or process runners.

pub mod context;
pub mod error;
pub mod executor;
pub mod planner;
pub mod types;

// Re-export main types at crate root
pub use context::{
    AutoConfirm, AutoDecline, CommandRunner, ConfirmCallback, DryRun, NoProgress,
    ProgressCallback, StepApplier,
};
pub use error::Error;
pub use executor::{RunReport, StepFailure, StepReport, execute, execute_simple};
pub use planner::ExecutionPlan;
pub use types::{
    ApplyResult, CommandOutput, ExecuteOptions, ExecuteSummary, FileMode, Owner,
    PackageProvider, ProvisionStep, ServiceAction,
};
