use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "api-scout")]
#[command(about = "Collect controller and DTO sources from a GitHub repository for API documentation")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    #[arg(long, value_name = "URL", global = true)]
    pub api_url: Option<String>,

    #[arg(long, value_name = "URL", global = true)]
    pub raw_url: Option<String>,

    #[arg(long, value_name = "TOKEN", global = true)]
    pub token: Option<String>,

    #[arg(long, value_name = "VERSION", global = true)]
    pub api_version: Option<String>,

    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Args)]
pub struct RepoArgs {
    pub owner: String,

    pub repo: String,

    #[arg(short = 'b', long, default_value = "main")]
    pub branch: String,

    #[arg(short = 'o', long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Controller sources with the data classes their methods take and return
    Analyze {
        #[command(flatten)]
        target: RepoArgs,

        #[arg(long, value_name = "N")]
        max_files: Option<usize>,

        /// Emit skipped files and unresolved types alongside the results
        #[arg(long)]
        report: bool,
    },
    /// Controllers plus build, config, logging and docs files
    Overview {
        #[command(flatten)]
        target: RepoArgs,
    },
    /// Direct download links for every file in the repository
    Files {
        #[command(flatten)]
        target: RepoArgs,

        #[arg(long, value_name = "PREFIX")]
        path: Option<String>,
    },
}
