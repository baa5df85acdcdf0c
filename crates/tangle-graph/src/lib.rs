//! # tangle-graph
//!
//! Discovers the full module-dependency graph of a project before
//! compilation.
//!
//! Starting from a set of root modules, the crawler classifies every module
//! it reaches as local (compiled from project source), native (supplied by
//! the host), or foreign (provided by a dependency package). Local modules
//! have their headers read and validated, and their imports crawled in turn.
//! Once nothing is left to crawl, per-module failures are reported together;
//! a clean graph is then checked for import cycles.
//!
//! ## Architecture
//!
//! ```text
//!                 ┌────────────────────────────┐
//!                 │        Coordinator         │
//!                 │ (owns Graph + dispatched)  │
//!                 └──────┬──────────────▲──────┘
//!              spawn     │              │  Outcome
//!                        ▼              │
//!   ┌──────────┐   ┌──────────┐   ┌─────┴────┐
//!   │ Worker A │   │ Worker B │   │ Worker C │  ... one per module
//!   └────┬─────┘   └──────────┘   └──────────┘
//!        │ classify / read / parse
//!        ▼
//!   ModuleClassifier · Runtime · HeaderParser
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tangle_graph::{CrawlEnv, Crawler, ModuleName, NativeRuntime, PackageId, ProjectDescriptor};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let env = CrawlEnv::new(
//!     "/path/to/project",
//!     ProjectDescriptor::application(PackageId::new("acme/app", "1.0.0")),
//! );
//!
//! let graph = Crawler::new(env, Arc::new(NativeRuntime::new()))
//!     .crawl([ModuleName::new("Main")?])
//!     .await?;
//!
//! for name in graph.build_order()? {
//!     println!("{name}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod classify;
pub mod crawl;
pub mod env;
pub mod error;
pub mod header;
pub mod module_name;
pub mod runtime;

#[cfg(test)]
mod tests;

pub use classify::{ClassifyError, DirectoryClassifier, Location, ModuleClassifier};
pub use crawl::{
    Asset, Collaborators, CrawlOptions, Crawler, Graph, Info, Outcome, Unvisited, check_cycles,
    crawl, crawl_one,
};
pub use env::{CrawlEnv, ForeignPackage, PackageId, ProjectDescriptor, ProjectKind};
pub use error::{CrawlError, CycleError, ModuleError};
pub use header::{
    Header, HeaderParseError, HeaderParser, ModuleTag, SourceHeaderParser, read_valid_header,
};
pub use module_name::{ModuleName, ModuleNameError};
pub use runtime::native::NativeRuntime;
pub use runtime::{Runtime, RuntimeError, RuntimeResult};

#[cfg(any(test, feature = "test-utils"))]
pub use runtime::memory::MemoryRuntime;
