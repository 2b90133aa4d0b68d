mod cmd;
mod logging;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "oql", version, about = "Render query blocks in markdown vaults")]
struct Cli {
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[arg(long, global = true)]
    profile: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Validate configuration and print resolved settings
    Doctor,

    /// Rebuild the search index over the vault and print statistics
    Reindex {
        /// List every indexed document
        #[arg(long, short)]
        verbose: bool,
    },

    /// Render one query block against the vault
    Query(QueryArgs),

    /// Render a note to HTML with its query blocks replaced by results
    Render(RenderArgs),

    /// Render a note, then re-render it whenever the vault changes
    Watch(WatchArgs),
}

#[derive(Debug, Args)]
pub struct QueryArgs {
    /// Block text (YAML); read from stdin when omitted
    pub block: Option<String>,

    /// Note the block belongs to, excluded from results by default
    #[arg(long)]
    pub source: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Note to render
    pub note: PathBuf,

    /// Write HTML here instead of stdout
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Note to render
    pub note: PathBuf,

    /// HTML file rewritten after every change
    #[arg(long, short)]
    pub output: PathBuf,
}

fn main() {
    let cli = Cli::parse();
    let config = cli.config.as_deref();
    let profile = cli.profile.as_deref();

    match cli.command {
        Commands::Doctor => cmd::doctor::run(config, profile),
        Commands::Reindex { verbose } => cmd::reindex::run(config, profile, verbose),
        Commands::Query(args) => cmd::query::run(config, profile, &args),
        Commands::Render(args) => cmd::render::run(config, profile, &args),
        Commands::Watch(args) => cmd::watch::run(config, profile, &args),
    }
}
