use std::path::Path;

use anyhow::Context;
use tokio::fs;

use tangle_graph::Graph;

use super::crawl_project;
use crate::cli::CrawlArgs;
use crate::error::{CliError, Result};
use crate::ui;

/// `tangle crawl`: resolve the graph, print a summary, optionally dump JSON.
pub async fn crawl_execute(args: CrawlArgs) -> Result<()> {
    let (project, graph) = crawl_project(&args.project).await?;

    ui::success(&format!(
        "Resolved {} module(s) for {}",
        graph.len(),
        project.manifest.package()
    ));
    println!("{}", ui::count("local", graph.locals.len()));
    println!("{}", ui::count("native", graph.natives.len()));
    println!("{}", ui::count("foreign", graph.foreigns.len()));

    if let Some(path) = &args.json {
        write_graph_json(path, &graph)
            .await
            .map_err(|source| CliError::Output {
                path: path.clone(),
                source,
            })?;
        ui::success(&format!("Wrote graph JSON to {}", path.display()));
    }

    Ok(())
}

async fn write_graph_json(path: &Path, graph: &Graph) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(graph).context("Failed to serialize graph")?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }

    fs::write(path, json.into_bytes())
        .await
        .context("Failed to write graph JSON")?;
    Ok(())
}
