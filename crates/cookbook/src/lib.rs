//! # Cookbook
//!
//! Provisioning recipes for the preview document-preview service.
//!
//! A recipe turns a [`Node`] (attributes, production overrides and a free-form
//! config layer) into an ordered [`declarative::ExecutionPlan`]. Planning is
//! pure: nothing here touches the host.
//!
//! ## Example
//!
//! ```
//! use cookbook::{Node, PlatformFamily, Recipe};
//!
//! let plan = Recipe::Default.plan(&Node::default(), PlatformFamily::Debian)?;
//! assert_eq!(plan.steps()[0].qualified_id(), "ensure_user:preview");
//! assert_eq!(
//!     plan.steps().last().map(|s| s.kind()),
//!     Some("ensure_service_running")
//! );
//! # Ok::<(), cookbook::Error>(())
//! ```

pub mod attributes;
pub mod error;
pub mod files;
pub mod install;
pub mod production;
pub mod recipes;
pub mod templates;

pub use attributes::Attributes;
pub use error::{Error, Result};
pub use install::{InstallSpec, InstallType, PlatformFamily};
pub use production::ProductionAttributes;
pub use recipes::{Node, Recipe};

/// Service name, also its user and group
pub const SERVICE_NAME: &str = "preview";

pub const SERVICE_HOME: &str = "/home/preview";

pub const CONFIG_PATH: &str = "/etc/preview.conf";

pub const INIT_SCRIPT_PATH: &str = "/etc/init.d/preview";

/// File name of the cached release archive
pub const RELEASE_ARCHIVE_NAME: &str = "preview.zip";
