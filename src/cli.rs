use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use cookbook::{PlatformFamily, Recipe};

#[derive(Parser)]
#[command(name = "preview-converge")]
#[command(author = "Nick Gerakines")]
#[command(version)]
#[command(about = "Plan and converge hosts running the preview service", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Node file with attributes and overrides
    #[arg(long, env = "PREVIEW_NODE_FILE", global = true)]
    pub node_file: Option<String>,

    /// Platform family, instead of detecting it from /etc/os-release
    #[arg(long, value_enum, global = true)]
    pub platform: Option<PlatformArg>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the ordered steps a recipe would apply
    Plan(PlanArgs),

    /// Print the effective service configuration
    Config(ConfigArgs),

    /// Apply a recipe to this host
    Converge(ConvergeArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args)]
pub struct PlanArgs {
    /// Recipe: app, deploy, default, build or node
    #[arg(value_parser = parse_recipe, default_value = "default")]
    pub recipe: Recipe,

    /// Print the plan as JSON
    #[arg(long)]
    pub json: bool,

    /// Only show steps matching a target (e.g. "packages" or "ensure_package.curl")
    #[arg(short, long)]
    pub target: Option<String>,
}

#[derive(Args)]
pub struct ConfigArgs {
    /// Include production overrides from [preview_prod]
    #[arg(long)]
    pub production: bool,
}

#[derive(Args)]
pub struct ConvergeArgs {
    /// Recipe: app, deploy, default, build or node
    #[arg(value_parser = parse_recipe, default_value = "default")]
    pub recipe: Recipe,

    /// Show what would change without changing anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum PlatformArg {
    Rhel,
    Debian,
    Other,
}

impl From<PlatformArg> for PlatformFamily {
    fn from(arg: PlatformArg) -> Self {
        match arg {
            PlatformArg::Rhel => PlatformFamily::Rhel,
            PlatformArg::Debian => PlatformFamily::Debian,
            PlatformArg::Other => PlatformFamily::Other,
        }
    }
}

fn parse_recipe(s: &str) -> Result<Recipe, String> {
    s.parse().map_err(|e: cookbook::Error| e.to_string())
}
