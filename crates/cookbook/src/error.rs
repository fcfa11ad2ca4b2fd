//! Error types for the cookbook crate

use thiserror::Error;

/// Errors raised while resolving attributes or building a plan.
///
/// All of these are detected before any step runs.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration merge failed
    #[error(transparent)]
    Schema(#[from] configtree::Error),

    /// A required attribute was not supplied (e.g. `preview_prod/node_id`)
    #[error("missing required attribute: {0}")]
    MissingRequiredAttribute(String),

    /// Install inputs are inconsistent
    #[error("invalid install spec: {0}")]
    InvalidInstallSpec(String),

    /// No template is registered under this name
    #[error("unknown template: {0}")]
    UnknownTemplate(String),

    /// A template placeholder has no matching variable
    #[error("template '{template}' references undefined variable '{variable}'")]
    TemplateVariableMissing { template: String, variable: String },

    /// No bundled file is registered under this name
    #[error("unknown bundled file: {0}")]
    UnknownFile(String),

    /// Recipe name not recognised
    #[error("unknown recipe '{0}' (expected app, deploy, default, build or node)")]
    UnknownRecipe(String),
}

/// Result type for cookbook operations
pub type Result<T> = std::result::Result<T, Error>;
