use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use lst_projector::Fold;

#[derive(Parser)]
#[command(
    name = "lst",
    about = "Line-status tracking: compare a text against its baseline",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log more (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the changed ranges between two files
    Diff(DiffArgs),
    /// Track a file pair through a script of edits
    Replay(ReplayArgs),
    /// Print the gutter blocks for a viewport
    Gutter(GutterArgs),
}

/// Files shared by every command.
#[derive(Args)]
pub struct PairArgs {
    /// Baseline file
    pub baseline: PathBuf,
    /// Current file
    pub current: PathBuf,
    /// Tracker configuration (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Whitespace-aware comparison
    #[arg(long)]
    pub smart: bool,
}

#[derive(Args)]
pub struct DiffArgs {
    #[command(flatten)]
    pub pair: PairArgs,
}

#[derive(Args)]
pub struct ReplayArgs {
    #[command(flatten)]
    pub pair: PairArgs,
    /// JSON list of edit steps
    pub script: PathBuf,
}

#[derive(Args)]
pub struct GutterArgs {
    #[command(flatten)]
    pub pair: PairArgs,
    /// First visible row
    #[arg(long, default_value = "0")]
    pub start: usize,
    /// Number of visible rows (all when omitted)
    #[arg(long)]
    pub rows: Option<usize>,
    /// Collapse lines, as START..END (repeatable)
    #[arg(long = "fold")]
    pub folds: Vec<Fold>,
}
