use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "savekeep")]
#[command(about = "Keeps a bounded history of compressed savegame backups")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Back up every configured game and rewrite SAVEGAMES.md
    Run(RunArgs),

    /// Show the archives stored for each game
    List(ListArgs),

    /// Print the directory name a game would be stored under
    Slug(SlugArgs),
}

#[derive(Parser)]
pub struct RunArgs {
    /// Config file (defaults to games.toml in the platform config directory)
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Build and compare archives without touching stores, trash or report
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    /// Show debug output
    #[arg(long, short = 'v', default_value_t = false)]
    pub verbose: bool,
}

#[derive(Parser)]
pub struct ListArgs {
    /// Config file (defaults to games.toml in the platform config directory)
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Only show games with this exact name
    #[arg(long)]
    pub game: Option<String>,

    /// Output as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Parser)]
pub struct SlugArgs {
    /// Game name as written in games.toml
    pub name: String,
}
