//! Command implementations.

mod crawl;
mod order;

pub use crawl::crawl_execute;
pub use order::order_execute;

use std::sync::Arc;

use tangle_config::{ConfigDiscovery, Overrides, Project};
use tangle_graph::{Crawler, Graph, ModuleName, NativeRuntime};

use crate::cli::ProjectArgs;
use crate::error::Result;
use crate::ui;

/// Load the manifest and crawl from the requested or configured roots.
pub(crate) async fn crawl_project(args: &ProjectArgs) -> Result<(Project, Graph)> {
    let start = match &args.dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir()?,
    };

    let overrides = Overrides {
        max_parallel: args
            .max_parallel
            .map(|n| usize::try_from(n).unwrap_or(usize::MAX)),
    };
    let project = ConfigDiscovery::new(&start).load(&overrides)?;

    let roots = if args.modules.is_empty() {
        project.manifest.root_modules()?
    } else {
        args.modules
            .iter()
            .map(ModuleName::new)
            .collect::<std::result::Result<Vec<_>, _>>()?
    };

    ui::info(&format!(
        "Crawling {} from {} root module(s)",
        project.manifest.package(),
        roots.len()
    ));

    let graph = Crawler::new(project.crawl_env()?, Arc::new(NativeRuntime::new()))
        .with_options(project.manifest.crawl_options())
        .crawl(roots)
        .await?;

    Ok((project, graph))
}
