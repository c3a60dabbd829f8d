use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "moss")]
#[command(about = "Submit files to MOSS and mirror the similarity report", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Upload files for comparison and print the result URL
    Submit(SubmitArgs),
    /// Download an existing report into a local directory
    Save {
        /// Result id printed by `submit`
        id: String,
        /// Directory to write the report into
        dir: PathBuf,
    },
    /// List the languages the server accepts
    Languages,
    /// Print configuration values
    PrintConfig,
}

#[derive(Debug, Args)]
pub struct SubmitArgs {
    /// Files to compare against each other
    pub files: Vec<PathBuf>,
    /// Glob pattern adding more files to compare
    #[arg(long = "pattern", value_name = "GLOB")]
    pub patterns: Vec<String>,
    /// Base file whose code is excluded from matches
    #[arg(short = 'b', long = "base", value_name = "FILE")]
    pub base_files: Vec<PathBuf>,
    /// Glob pattern adding more base files
    #[arg(long = "base-pattern", value_name = "GLOB")]
    pub base_patterns: Vec<String>,
    /// Source language
    #[arg(short, long)]
    pub language: Option<String>,
    /// Treat each directory as one submission (true/false)
    #[arg(short, long)]
    pub directory: Option<String>,
    /// Use the experimental server (true/false)
    #[arg(short = 'x', long)]
    pub experimental: Option<String>,
    /// Ignore passages that appear more often than this
    #[arg(short = 'm', long)]
    pub max_matches: Option<i64>,
    /// Number of matching pairs to show in the report
    #[arg(short = 'n', long)]
    pub show: Option<i64>,
    /// Comment attached to the report
    #[arg(short, long)]
    pub comment: Option<String>,
    /// Mirror the report into this directory once the submission completes
    #[arg(long, value_name = "DIR")]
    pub save: Option<PathBuf>,
}
