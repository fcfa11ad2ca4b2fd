//! `plan` - show the ordered steps of a recipe

use anyhow::{Context as AnyhowContext, Result};

use crate::Context;
use crate::cli::PlanArgs;
use crate::ui;

pub fn run(ctx: &Context, args: PlanArgs) -> Result<()> {
    let target = super::load_target(ctx)?;
    let plan = args
        .recipe
        .plan(&target.node, target.platform_family)
        .with_context(|| format!("Could not plan recipe {}", args.recipe))?
        .filter_by_target(args.target.as_deref());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    if !ctx.quiet {
        ui::header(&format!("Recipe {}", plan.name));
        ui::kv("node file", &target.node_file.display().to_string());
        ui::kv("platform", target.platform_family.name());
        ui::kv("install", target.node.attributes.install_type.name());
        println!();
    }

    if plan.is_empty() {
        ui::info("No steps match");
        return Ok(());
    }

    for (index, step) in plan.iter().enumerate() {
        ui::step(index + 1, plan.len(), &step.description());
        if ctx.verbose > 0 {
            ui::dim(&step.qualified_id());
        }
    }

    Ok(())
}
