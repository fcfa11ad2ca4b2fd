//! Node file loading

use anyhow::{Context, Result};
use cookbook::Node;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub const DEFAULT_NODE_FILE: &str = "/etc/preview-converge/node.toml";

/// Resolve the node file path, expanding `~` and environment variables
pub fn node_file_path(arg: Option<&str>) -> Result<PathBuf> {
    let raw = arg.unwrap_or(DEFAULT_NODE_FILE);
    let expanded = shellexpand::full(raw)
        .with_context(|| format!("Could not expand node file path {raw}"))?;
    Ok(PathBuf::from(expanded.as_ref()))
}

/// Load a node file; a missing file means all defaults
pub fn load(path: &Path) -> Result<Node> {
    match fs::read_to_string(path) {
        Ok(content) => {
            log::info!("Loading node file {}", path.display());
            parse(&content).with_context(|| format!("Invalid node file {}", path.display()))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            log::info!("No node file at {}, using defaults", path.display());
            Ok(Node::default())
        }
        Err(e) => Err(e).with_context(|| format!("Could not read {}", path.display())),
    }
}

pub fn parse(content: &str) -> Result<Node> {
    Ok(toml::from_str(content)?)
}
