pub mod config;
pub mod converge;
pub mod plan;

use anyhow::Result;
use cookbook::{Node, PlatformFamily};
use std::path::PathBuf;

use crate::Context;
use crate::{node, platform};

/// The node being worked on and the family it is planned for
pub struct Target {
    pub node: Node,
    pub node_file: PathBuf,
    pub platform_family: PlatformFamily,
}

/// Load the node file and settle the platform family
///
/// The `--platform` flag wins over the node file, which wins over detection.
pub fn load_target(ctx: &Context) -> Result<Target> {
    let node_file = node::node_file_path(ctx.node_file.as_deref())?;
    let node = node::load(&node_file)?;

    let platform_family = ctx
        .platform
        .unwrap_or_else(|| node.platform_family(platform::detect));
    log::info!("Planning for platform family {platform_family}");

    Ok(Target {
        node,
        node_file,
        platform_family,
    })
}
