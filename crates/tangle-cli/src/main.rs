//! Tangle CLI - module-dependency crawler.
//!
//! Parses arguments, initializes logging, and dispatches to a command.

use clap::Parser;
use miette::Result;
use tangle_cli::{cli, commands, error, logger, ui};

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    logger::init_logger(args.verbose, args.quiet, args.no_color);
    ui::init_colors(args.no_color);

    let result = match args.command {
        cli::Command::Crawl(crawl_args) => commands::crawl_execute(crawl_args).await,
        cli::Command::Order(order_args) => commands::order_execute(order_args).await,
    };

    result.map_err(error::cli_error_to_miette)
}
