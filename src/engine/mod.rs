//! Host execution
//!
//! Steps are translated into commands in [`commands`], archives are handled
//! by [`archive`], and [`HostApplier`] ties them together behind the
//! [`declarative::StepApplier`] seam.

pub mod archive;
pub mod commands;
pub mod host;

pub use host::HostApplier;
