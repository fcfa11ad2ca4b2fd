//! `config` - print the effective service configuration

use anyhow::{Context as AnyhowContext, Result};
use cookbook::templates;
use std::collections::BTreeMap;

use crate::Context;
use crate::cli::ConfigArgs;

/// Print exactly what would be written to the service config file
pub fn run(ctx: &Context, args: ConfigArgs) -> Result<()> {
    let target = super::load_target(ctx)?;
    let config = target
        .node
        .effective_config(args.production)
        .context("Could not resolve configuration")?;

    let mut variables = BTreeMap::new();
    variables.insert("json".to_string(), config.to_pretty_json()?);
    print!("{}", templates::render(templates::PREVIEW_CONF, &variables)?);
    Ok(())
}
