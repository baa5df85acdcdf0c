use std::sync::Arc;

use tokio::sync::{Semaphore, mpsc};

use super::graph::{Asset, Outcome, Unvisited};
use crate::classify::{Location, ModuleClassifier};
use crate::env::CrawlEnv;
use crate::error::ModuleError;
use crate::header::{HeaderParser, read_valid_header};
use crate::module_name::ModuleName;
use crate::runtime::Runtime;

/// Everything a worker needs, shared read-only across tasks.
#[derive(Debug, Clone)]
pub struct Collaborators {
    pub env: Arc<CrawlEnv>,
    pub runtime: Arc<dyn Runtime>,
    pub classifier: Arc<dyn ModuleClassifier>,
    pub parser: Arc<dyn HeaderParser>,
}

/// Resolve one requested module.
///
/// Failures are keyed by `unvisited.name`, whatever the file turns out to
/// declare.
pub async fn crawl_one(collaborators: &Collaborators, unvisited: &Unvisited) -> Outcome {
    match resolve(collaborators, &unvisited.name).await {
        Ok(asset) => Outcome::Found(asset),
        Err(err) => Outcome::Failed(unvisited.name.clone(), err),
    }
}

async fn resolve(c: &Collaborators, name: &ModuleName) -> Result<Asset, ModuleError> {
    let location = c.classifier.classify(&c.env, name).await?;

    let asset = match location {
        Location::Local(path) => {
            let info =
                read_valid_header(c.runtime.as_ref(), c.parser.as_ref(), &c.env, name, &path)
                    .await?;
            Asset::Local {
                name: name.clone(),
                info,
            }
        }
        Location::Native(path) => Asset::Native {
            name: name.clone(),
            path,
        },
        Location::Foreign(package) => Asset::Foreign {
            name: name.clone(),
            package,
        },
    };

    Ok(asset)
}

/// Sends exactly one outcome for a name.
///
/// Dropping it unsent reports `WorkerLost`, so a panicking or cancelled task
/// still decrements the coordinator's pending count.
struct Reply {
    name: ModuleName,
    tx: Option<mpsc::UnboundedSender<Outcome>>,
}

impl Reply {
    fn new(name: ModuleName, tx: mpsc::UnboundedSender<Outcome>) -> Self {
        Self { name, tx: Some(tx) }
    }

    fn send(mut self, outcome: Outcome) {
        if let Some(tx) = self.tx.take() {
            // receiver gone means the crawl was abandoned
            let _ = tx.send(outcome);
        }
    }
}

impl Drop for Reply {
    fn drop(&mut self) {
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(Outcome::Failed(self.name.clone(), ModuleError::WorkerLost));
        }
    }
}

/// Spawn a worker task for `unvisited`.
pub(crate) fn spawn(
    collaborators: Arc<Collaborators>,
    unvisited: Unvisited,
    limit: Option<Arc<Semaphore>>,
    tx: mpsc::UnboundedSender<Outcome>,
) {
    let reply = Reply::new(unvisited.name.clone(), tx);

    tokio::spawn(async move {
        let _permit = match limit {
            Some(semaphore) => match semaphore.acquire_owned().await {
                Ok(permit) => Some(permit),
                Err(_) => return,
            },
            None => None,
        };

        let outcome = crawl_one(&collaborators, &unvisited).await;
        reply.send(outcome);
    });
}
