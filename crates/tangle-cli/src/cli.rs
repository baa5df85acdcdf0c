//! Command-line interface definition for tangle.
//!
//! - `tangle crawl` - crawl the module graph and summarise it
//! - `tangle order` - print local modules in build order

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Tangle - resolve a project's module-dependency graph
#[derive(Parser, Debug)]
#[command(
    name = "tangle",
    version,
    about = "Resolve a project's module-dependency graph",
    long_about = "Tangle starts from a project's root modules, discovers every module they\n\
                  transitively import, validates each module header, and rejects the\n\
                  project if its local imports form a cycle."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Crawl the module graph and report what was found
    Crawl(CrawlArgs),

    /// Print local modules so that each comes after its imports
    Order(OrderArgs),
}

/// Options shared by every command that crawls.
#[derive(Args, Debug, Clone, Default)]
pub struct ProjectArgs {
    /// Directory to start looking for tangle.toml in (defaults to the current directory)
    #[arg(short = 'p', long = "project", value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Maximum number of modules read at once
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
    pub max_parallel: Option<u64>,

    /// Root modules to crawl from (defaults to the manifest's entry or exposed modules)
    #[arg(value_name = "MODULE")]
    pub modules: Vec<String>,
}

#[derive(Args, Debug, Clone)]
pub struct CrawlArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Write the resolved graph as JSON to this file
    #[arg(long, value_name = "FILE")]
    pub json: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct OrderArgs {
    #[command(flatten)]
    pub project: ProjectArgs,
}
