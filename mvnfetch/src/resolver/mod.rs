//! The concurrent resolver/downloader engine.
//!
//! [`Resolver`] owns the configuration for a resolve run: the seed
//! repositories, the download root, the worker bound, the processor chain
//! and the transport. Each [`Resolver::resolve`] call fans one download
//! task out per root dependency; tasks share one repository set (which
//! grows as descriptors declare new repositories) and one task registry
//! (which guarantees every scheduled child is joined before the call
//! returns).
//!
//! # Example
//!
//! ```no_run
//! use mvnfetch::artifact::{Coordinate, Dependency};
//! use mvnfetch::resolver::Resolver;
//! use url::Url;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let central = Url::parse("https://repo.maven.apache.org/maven2")?;
//! let resolver = Resolver::new(vec![central], "./libs")?;
//!
//! let root = Dependency::new(Coordinate::new("org.example", "lib", "1.0")?)
//!     .transitive(true);
//! let results = resolver.resolve(vec![root]).await;
//!
//! for result in &results {
//!     println!("{}: success={}", result.dependency(), result.is_success());
//! }
//! # Ok(())
//! # }
//! ```

mod pool;
mod registry;
mod repo_set;
mod result;
mod task;

pub use pool::WorkerPool;
pub use repo_set::RepositorySet;
pub use result::{DownloadError, DownloadResult};

use std::path::PathBuf;
use std::sync::Arc;

use futures::future::join_all;
use tracing::debug;
use url::Url;

use crate::artifact::{Dependency, TransitiveDependencyProcessor};
use crate::http::{FetchError, HttpClient, ReqwestClient};
use crate::metadata::MetadataFetcher;
use crate::resolver::registry::TaskRegistry;
use crate::resolver::task::{DownloadTask, ResolveContext};

/// Default bound on concurrently downloading tasks.
const DEFAULT_WORKERS: usize = 8;

/// Resolves root dependencies and their transitive closure into a local
/// directory tree.
pub struct Resolver {
    http: Arc<dyn HttpClient>,
    repositories: Vec<Url>,
    download_root: PathBuf,
    processors: Vec<Arc<dyn TransitiveDependencyProcessor>>,
    workers: usize,
}

impl Resolver {
    /// Create a resolver using the bundled reqwest transport.
    ///
    /// # Errors
    ///
    /// Fails only if the HTTP client cannot be constructed.
    pub fn new(
        repositories: Vec<Url>,
        download_root: impl Into<PathBuf>,
    ) -> Result<Self, FetchError> {
        Ok(Self::with_http_client(
            Arc::new(ReqwestClient::new()?),
            repositories,
            download_root,
        ))
    }

    /// Create a resolver over a custom transport.
    pub fn with_http_client(
        http: Arc<dyn HttpClient>,
        repositories: Vec<Url>,
        download_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            http,
            repositories,
            download_root: download_root.into(),
            processors: Vec::new(),
            workers: DEFAULT_WORKERS,
        }
    }

    /// Bound the number of concurrently downloading tasks (min 1).
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Append a transitive-dependency processor to the chain.
    ///
    /// Processors run in registration order over every dependency a
    /// descriptor declares, before the child download is scheduled.
    pub fn with_processor(
        mut self,
        processor: impl TransitiveDependencyProcessor + 'static,
    ) -> Self {
        self.processors.push(Arc::new(processor));
        self
    }

    /// Resolve the given roots and their transitive closures.
    ///
    /// Returns one result per root, in input order; transitive outcomes
    /// hang off their root. Failures never surface as errors or panics:
    /// inspect [`DownloadResult::is_success`] per root.
    pub async fn resolve(&self, roots: Vec<Dependency>) -> Vec<DownloadResult> {
        let context = Arc::new(ResolveContext {
            http: Arc::clone(&self.http),
            fetcher: MetadataFetcher::new(Arc::clone(&self.http)),
            repositories: RepositorySet::seeded(self.repositories.iter().cloned()),
            registry: TaskRegistry::default(),
            pool: WorkerPool::new(self.workers),
            processors: self.processors.clone(),
            download_root: self.download_root.clone(),
        });

        debug!(
            roots = roots.len(),
            repositories = context.repositories.len(),
            workers = context.pool.workers(),
            "starting resolve run"
        );

        let futures: Vec<_> = roots
            .into_iter()
            .map(|dependency| DownloadTask::new(Arc::clone(&context), dependency, false).spawn())
            .collect();

        let results = join_all(futures).await;

        // Parents join their children before completing, so the registry
        // is normally settled here; the drain makes the guarantee
        // structural rather than incidental.
        context.registry.drain().await;

        results
    }
}
