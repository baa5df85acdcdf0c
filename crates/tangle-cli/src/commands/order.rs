use super::crawl_project;
use crate::cli::OrderArgs;
use crate::error::Result;
use crate::ui;

/// `tangle order`: print local modules, imports first, one per line.
pub async fn order_execute(args: OrderArgs) -> Result<()> {
    let (_, graph) = crawl_project(&args.project).await?;

    // crawl already rejected cycles
    let order = graph.build_order().map_err(tangle_graph::CrawlError::from)?;
    if order.is_empty() {
        ui::warning("No local modules found");
    }

    for name in order {
        println!("{name}");
    }
    Ok(())
}
