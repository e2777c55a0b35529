//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use sasspiler::builder::sass::OutputStyle;
use sasspiler::util::shell::ColorChoice;

/// sasspiler - compile a tree of Sass stylesheets into CSS
#[derive(Parser)]
#[command(name = "sasspiler")]
#[command(author, version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Coloring: auto, always, never
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    #[command(flatten)]
    pub compile: CompileArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the sasspiler version
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct CompileArgs {
    /// Stylesheet file or directory to compile
    #[arg(short, long)]
    pub source: Option<PathBuf>,

    /// Output directory, or output file for a single stylesheet
    #[arg(short, long)]
    pub dest: Option<PathBuf>,

    /// Extra import directories (comma-separated, repeatable)
    #[arg(short = 'i', long = "import-dir", value_delimiter = ',')]
    pub import_dirs: Vec<PathBuf>,

    /// Compile files in parallel
    #[arg(long)]
    pub parallel: bool,

    /// Number of parallel jobs (implies --parallel)
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Output style: expanded, compressed
    #[arg(long)]
    pub style: Option<OutputStyle>,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
