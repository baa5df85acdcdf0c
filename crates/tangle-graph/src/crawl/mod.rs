//! Concurrent dependency crawl.
//!
//! The coordinator owns the [`Graph`] and a `dispatched` set. It spawns one
//! task per module, drains a single result channel, and expands local modules
//! as their results arrive. A counter of outstanding tasks decides when the
//! crawl is over; workers never touch the graph.
//!
//! ```text
//! roots ──► dispatch ──► worker ──► channel ──► coordinator ──┐
//!              ▲                                              │
//!              └──────────── new imports of Local ◄───────────┘
//! ```
//!
//! A name is inserted into `dispatched` when its worker is spawned, not when
//! its result arrives, so two in-flight parents importing the same module
//! cannot both dispatch it.

mod cycles;
mod graph;
mod worker;

pub use cycles::check_cycles;
pub use graph::{Asset, Graph, Info, Outcome, Unvisited};
pub use worker::{Collaborators, crawl_one};

use std::collections::BTreeMap;
use std::sync::Arc;

use rustc_hash::FxHashSet;
use tokio::sync::{Semaphore, mpsc};

use crate::classify::{DirectoryClassifier, ModuleClassifier};
use crate::env::CrawlEnv;
use crate::error::CrawlError;
use crate::header::{HeaderParser, SourceHeaderParser};
use crate::module_name::ModuleName;
use crate::runtime::Runtime;

/// Tuning knobs for a crawl.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlOptions {
    /// Upper bound on workers doing I/O at once. `None` means one running
    /// task per discovered module.
    pub max_parallel: Option<usize>,
}

impl CrawlOptions {
    pub fn with_max_parallel(mut self, limit: usize) -> Self {
        self.max_parallel = Some(limit);
        self
    }
}

/// Crawls a project's module graph.
#[derive(Debug, Clone)]
pub struct Crawler {
    collaborators: Collaborators,
    options: CrawlOptions,
}

impl Crawler {
    /// Crawler using the default classifier and header parser over `runtime`.
    pub fn new(env: CrawlEnv, runtime: Arc<dyn Runtime>) -> Self {
        Self {
            collaborators: Collaborators {
                env: Arc::new(env),
                classifier: Arc::new(DirectoryClassifier::new(runtime.clone())),
                runtime,
                parser: Arc::new(SourceHeaderParser),
            },
            options: CrawlOptions::default(),
        }
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn ModuleClassifier>) -> Self {
        self.collaborators.classifier = classifier;
        self
    }

    pub fn with_parser(mut self, parser: Arc<dyn HeaderParser>) -> Self {
        self.collaborators.parser = parser;
        self
    }

    pub fn with_options(mut self, options: CrawlOptions) -> Self {
        self.options = options;
        self
    }

    pub fn env(&self) -> &CrawlEnv {
        &self.collaborators.env
    }

    /// Crawl everything reachable from `roots`.
    ///
    /// Per-module failures do not stop the crawl; they are collected and
    /// returned together once no work is left. Cycle detection only runs on a
    /// graph without failures.
    pub async fn crawl<I>(&self, roots: I) -> Result<Graph, CrawlError>
    where
        I: IntoIterator<Item = ModuleName>,
    {
        let roots: Vec<ModuleName> = roots.into_iter().collect();
        if roots.is_empty() {
            return Err(CrawlError::NoRoots);
        }

        tracing::info!(
            roots = roots.len(),
            max_parallel = ?self.options.max_parallel,
            "Starting module crawl"
        );

        let mut coordinator = Coordinator::new(self.collaborators.clone(), self.options);
        for root in roots {
            coordinator.dispatch(Unvisited::root(root));
        }
        let graph = coordinator.run().await?;

        tracing::info!(
            locals = graph.locals.len(),
            natives = graph.natives.len(),
            foreigns = graph.foreigns.len(),
            "Module crawl complete"
        );

        Ok(graph)
    }
}

/// Crawl with the default collaborators.
pub async fn crawl<I>(
    env: CrawlEnv,
    runtime: Arc<dyn Runtime>,
    roots: I,
) -> Result<Graph, CrawlError>
where
    I: IntoIterator<Item = ModuleName>,
{
    Crawler::new(env, runtime).crawl(roots).await
}

struct Coordinator {
    collaborators: Arc<Collaborators>,
    limit: Option<Arc<Semaphore>>,
    tx: mpsc::UnboundedSender<Outcome>,
    rx: mpsc::UnboundedReceiver<Outcome>,
    graph: Graph,
    dispatched: FxHashSet<ModuleName>,
    importers: BTreeMap<ModuleName, ModuleName>,
    pending: usize,
}

impl Coordinator {
    fn new(collaborators: Collaborators, options: CrawlOptions) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            collaborators: Arc::new(collaborators),
            limit: options
                .max_parallel
                .map(|n| Arc::new(Semaphore::new(n.max(1)))),
            tx,
            rx,
            graph: Graph::new(),
            dispatched: FxHashSet::default(),
            importers: BTreeMap::new(),
            pending: 0,
        }
    }

    /// Spawn a worker unless the name was already dispatched.
    fn dispatch(&mut self, unvisited: Unvisited) {
        if !self.dispatched.insert(unvisited.name.clone()) {
            return;
        }

        if let Some(parent) = &unvisited.parent {
            self.importers
                .insert(unvisited.name.clone(), parent.clone());
        }

        tracing::debug!(
            module = %unvisited.name,
            parent = ?unvisited.parent.as_ref().map(ModuleName::as_str),
            "Dispatching worker"
        );

        worker::spawn(
            Arc::clone(&self.collaborators),
            unvisited,
            self.limit.clone(),
            self.tx.clone(),
        );
        self.pending += 1;
    }

    async fn run(mut self) -> Result<Graph, CrawlError> {
        while self.pending > 0 {
            // self.tx keeps the channel open, so recv only waits
            let Some(outcome) = self.rx.recv().await else {
                break;
            };
            self.pending -= 1;
            self.apply(outcome);
        }

        if !self.graph.problems.is_empty() {
            tracing::info!(
                problems = self.graph.problems.len(),
                "Module crawl failed"
            );
            return Err(CrawlError::Modules {
                problems: std::mem::take(&mut self.graph.problems),
                importers: self.importers,
            });
        }

        check_cycles(&self.graph.locals)?;
        Ok(self.graph)
    }

    fn apply(&mut self, outcome: Outcome) {
        match &outcome {
            Outcome::Found(Asset::Local { name, info }) => {
                tracing::debug!(module = %name, deps = info.deps.len(), "Local module");
                for dep in &info.deps {
                    self.dispatch(Unvisited::imported_by(dep.clone(), name.clone()));
                }
            }
            Outcome::Found(Asset::Native { name, path }) => {
                tracing::debug!(module = %name, path = %path.display(), "Native module");
            }
            Outcome::Found(Asset::Foreign { name, package }) => {
                tracing::debug!(module = %name, package = %package, "Foreign module");
            }
            Outcome::Failed(name, err) => {
                tracing::warn!(module = %name, error = %err, "Module failed");
            }
        }
        self.graph.insert(outcome);
    }
}
