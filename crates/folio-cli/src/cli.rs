use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use folio_patch::PatchDialect;

#[derive(Parser)]
#[command(
    name = "folio",
    about = "Folio: revision diffs and agent patches for structured documents",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Configuration file (defaults to ./folio.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

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
    /// Show field changes between two revision snapshots
    Diff(DiffArgs),
    /// Validate a patch and print its canonical unified form
    Normalize(NormalizeArgs),
    /// Apply a patch to a text file with zero fuzz
    Apply(ApplyArgs),
}

#[derive(Args)]
pub struct DiffArgs {
    /// Earlier snapshot (JSON)
    pub from: PathBuf,
    /// Later snapshot (JSON)
    pub to: PathBuf,
    /// Document kind whose schema to use
    #[arg(long)]
    pub kind: Option<String>,
}

#[derive(Args)]
pub struct NormalizeArgs {
    /// Patch file, or `-` for stdin
    pub patch: PathBuf,
    /// Patch dialect (unified or codex)
    #[arg(short, long)]
    pub dialect: Option<PatchDialect>,
    /// Field the patch must target
    #[arg(short, long)]
    pub field: Option<String>,
}

#[derive(Args)]
pub struct ApplyArgs {
    /// Current text
    pub base: PathBuf,
    /// Patch file, or `-` for stdin
    pub patch: PathBuf,
    /// Patch dialect (unified or codex)
    #[arg(short, long)]
    pub dialect: Option<PatchDialect>,
    /// Field the patch must target
    #[arg(short, long)]
    pub field: Option<String>,
    /// Write the result here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
