//! The download task: one unit of resolution work per dependency.
//!
//! A task resolves a single coordinate across the repository set,
//! downloads and verifies the artifact, installs it into the local tree,
//! and, for transitive dependencies, schedules child tasks for the
//! dependencies its descriptor declares. Child futures are shared between
//! the parent (which joins them after installing its own artifact) and the
//! run-wide registry (which guarantees they are joined before the resolve
//! returns).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::future::{join_all, BoxFuture};
use futures::FutureExt;
use tracing::{debug, trace, warn};
use url::Url;

use crate::artifact::{
    Coordinate, Dependency, TransitiveDependency, TransitiveDependencyProcessor,
};
use crate::checksum::{self, ChecksumAlgo};
use crate::http::{FetchError, HttpClient};
use crate::layout;
use crate::metadata::{
    is_relevant_scope, parse_project, MetadataError, MetadataFetcher, Project,
    RepositoryMetadata,
};
use crate::resolver::pool::WorkerPool;
use crate::resolver::registry::{DownloadFuture, TaskRegistry};
use crate::resolver::repo_set::RepositorySet;
use crate::resolver::result::{DownloadError, DownloadResult};
use crate::store;

/// Extension of the artifact binary.
const JAR_EXT: &str = "jar";

/// Extension of the project descriptor.
const POM_EXT: &str = "pom";

/// State shared by every task of one resolve run.
pub(crate) struct ResolveContext {
    pub(crate) http: Arc<dyn HttpClient>,
    pub(crate) fetcher: MetadataFetcher,
    pub(crate) repositories: RepositorySet,
    pub(crate) registry: TaskRegistry,
    pub(crate) pool: WorkerPool,
    pub(crate) processors: Vec<Arc<dyn TransitiveDependencyProcessor>>,
    pub(crate) download_root: PathBuf,
}

/// A scheduled child download plus the optionality its parent declared.
///
/// The optional flag lives here rather than on the shared result: when a
/// deduplicated child is awaited by two parents, each applies its own
/// declared policy to the shared outcome.
struct ChildDownload {
    future: DownloadFuture,
    optional: bool,
}

/// How one repository attempt ended.
enum RepositoryAttempt {
    /// The repository produced a decision for this task: either a
    /// successful download (with pending children) or a fatal error.
    Resolved(Result<Vec<ChildDownload>, DownloadError>),

    /// The repository cannot serve the artifact; try the next one.
    NextRepository,
}

/// Resolves and downloads one dependency.
pub(crate) struct DownloadTask {
    context: Arc<ResolveContext>,
    dependency: Dependency,
    optional: bool,
}

impl DownloadTask {
    pub(crate) fn new(
        context: Arc<ResolveContext>,
        dependency: Dependency,
        optional: bool,
    ) -> Self {
        Self {
            context,
            dependency,
            optional,
        }
    }

    /// Start the task on the runtime and return its shareable future.
    ///
    /// A task killed by runtime shutdown materializes as an `Aborted`
    /// failure; no join error ever reaches a parent.
    pub(crate) fn spawn(self) -> DownloadFuture {
        let dependency = self.dependency.clone();
        let artifact_path = layout::local_artifact_path(
            &self.context.download_root,
            dependency.coordinate(),
            JAR_EXT,
        );
        let optional = self.optional;

        let handle = tokio::spawn(self.run());
        async move {
            match handle.await {
                Ok(result) => result,
                Err(error) => DownloadResult::failure(
                    dependency,
                    artifact_path,
                    optional,
                    DownloadError::Aborted(error.to_string()),
                ),
            }
        }
        .boxed()
        .shared()
    }

    /// The task future. Boxed: the future recursively contains the futures
    /// of the children it spawns.
    fn run(self) -> BoxFuture<'static, DownloadResult> {
        async move { self.execute().await }.boxed()
    }

    async fn execute(self) -> DownloadResult {
        let coordinate = self.dependency.coordinate().clone();
        let artifact_path =
            layout::local_artifact_path(&self.context.download_root, &coordinate, JAR_EXT);
        let pom_path =
            layout::local_artifact_path(&self.context.download_root, &coordinate, POM_EXT);
        trace!(dependency = %self.dependency, "resolving");

        // Already installed: no network I/O for the artifact itself, but a
        // transitive dependency with a cached descriptor still expands its
        // children.
        if artifact_path.exists() {
            debug!(dependency = %self.dependency, "already downloaded");
            let transitive = self.expand_from_cached_descriptor(&pom_path).await;
            return DownloadResult::success(
                self.dependency.clone(),
                artifact_path,
                self.optional,
                transitive,
            );
        }

        // Hold a worker slot for the network/disk phase only; it is
        // released before children are joined.
        let permit = self.context.pool.acquire().await;

        let mut outcome = None;
        for repository in self.context.repositories.snapshot() {
            debug!(repository = %repository, dependency = %self.dependency, "trying repository");
            match self
                .try_repository(&repository, &artifact_path, &pom_path)
                .await
            {
                RepositoryAttempt::Resolved(result) => {
                    outcome = Some(result);
                    break;
                }
                RepositoryAttempt::NextRepository => continue,
            }
        }
        drop(permit);

        match outcome {
            Some(Ok(children)) => {
                let transitive = collect_children(children).await;
                debug!(dependency = %self.dependency, "download succeeded");
                DownloadResult::success(
                    self.dependency.clone(),
                    artifact_path,
                    self.optional,
                    transitive,
                )
            }
            Some(Err(error)) => {
                debug!(dependency = %self.dependency, error = %error, "download failed");
                DownloadResult::failure(
                    self.dependency.clone(),
                    artifact_path,
                    self.optional,
                    error,
                )
            }
            None => {
                debug!(dependency = %self.dependency, "not found in any repository");
                DownloadResult::failure(
                    self.dependency.clone(),
                    artifact_path,
                    self.optional,
                    DownloadError::Exhausted,
                )
            }
        }
    }

    /// Expand children from the descriptor cached next to the artifact,
    /// if the dependency is transitive and the descriptor is present.
    async fn expand_from_cached_descriptor(&self, pom_path: &Path) -> Vec<DownloadResult> {
        if !self.dependency.is_transitive() || !pom_path.exists() {
            return Vec::new();
        }

        let project = match std::fs::read(pom_path) {
            Ok(bytes) => match parse_project(&bytes) {
                Ok(project) => project,
                Err(error) => {
                    warn!(
                        path = %pom_path.display(),
                        error = %error,
                        "cached descriptor is malformed, skipping transitive expansion"
                    );
                    return Vec::new();
                }
            },
            Err(error) => {
                warn!(path = %pom_path.display(), error = %error, "failed to read cached descriptor");
                return Vec::new();
            }
        };

        collect_children(self.expand_transitive(&project)).await
    }

    /// One iteration of the per-repository loop.
    async fn try_repository(
        &self,
        repository: &Url,
        artifact_path: &Path,
        pom_path: &Path,
    ) -> RepositoryAttempt {
        let coordinate = self.dependency.coordinate();

        // Direct probe: releases usually sit at their canonical URL, so
        // try that before any metadata round-trips. Snapshots always need
        // metadata to learn their timestamped file name.
        if !coordinate.is_snapshot() {
            let urls = layout::direct_artifact_url(repository, coordinate, POM_EXT)
                .and_then(|pom_url| {
                    layout::direct_artifact_url(repository, coordinate, JAR_EXT)
                        .map(|jar_url| (pom_url, jar_url))
                });
            match urls {
                Ok((pom_url, jar_url)) => {
                    match self
                        .download(repository, &pom_url, &jar_url, artifact_path, pom_path)
                        .await
                    {
                        Ok(children) => return RepositoryAttempt::Resolved(Ok(children)),
                        Err(DownloadError::Connectivity { url, reason }) => {
                            warn!(repository = %repository, url = %url, reason = %reason, "connection failed");
                            return RepositoryAttempt::NextRepository;
                        }
                        Err(DownloadError::NotFound { .. }) => {
                            trace!(
                                dependency = %self.dependency,
                                "direct artifact URL missed, trying metadata"
                            );
                        }
                        Err(fatal) => return RepositoryAttempt::Resolved(Err(fatal)),
                    }
                }
                Err(error) => {
                    warn!(repository = %repository, error = %error, "cannot build artifact URL under repository");
                    return RepositoryAttempt::NextRepository;
                }
            }
        }

        // Metadata-driven resolution.
        let group_url = match layout::group_metadata_url(repository, coordinate) {
            Ok(url) => url,
            Err(error) => {
                warn!(repository = %repository, error = %error, "cannot build metadata URL under repository");
                return RepositoryAttempt::NextRepository;
            }
        };
        let group_meta = match self
            .metadata_or_skip(repository, self.context.fetcher.group_metadata(&group_url).await)
        {
            Some(meta) => meta,
            None => return RepositoryAttempt::NextRepository,
        };

        let meta_url = match layout::artifact_metadata_url(repository, &group_meta, coordinate) {
            Ok(url) => url,
            Err(error) => {
                warn!(repository = %repository, error = %error, "cannot build metadata URL under repository");
                return RepositoryAttempt::NextRepository;
            }
        };
        let artifact_meta = match self.metadata_or_skip(
            repository,
            self.context.fetcher.artifact_metadata(&meta_url).await,
        ) {
            Some(meta) => meta,
            None => return RepositoryAttempt::NextRepository,
        };

        let urls = layout::artifact_url(repository, &artifact_meta, coordinate, POM_EXT)
            .and_then(|pom_url| {
                layout::artifact_url(repository, &artifact_meta, coordinate, JAR_EXT)
                    .map(|jar_url| (pom_url, jar_url))
            });
        let (pom_url, jar_url) = match urls {
            Ok(urls) => urls,
            Err(error) => {
                warn!(repository = %repository, error = %error, "cannot build artifact URL under repository");
                return RepositoryAttempt::NextRepository;
            }
        };

        // The repository produced a coherent artifact URL; its download
        // outcome decides this task, success or not.
        RepositoryAttempt::Resolved(
            self.download(repository, &pom_url, &jar_url, artifact_path, pom_path)
                .await,
        )
    }

    /// Shared error policy for both metadata fetches: anything short of a
    /// parsed document moves on to the next repository.
    fn metadata_or_skip(
        &self,
        repository: &Url,
        result: Result<Option<RepositoryMetadata>, MetadataError>,
    ) -> Option<RepositoryMetadata> {
        match result {
            Ok(Some(meta)) => Some(meta),
            Ok(None) => {
                debug!(dependency = %self.dependency, repository = %repository, "not found in repository");
                None
            }
            Err(MetadataError::Fetch(FetchError::Connectivity(reason))) => {
                warn!(repository = %repository, reason = %reason, "connection failed");
                None
            }
            Err(MetadataError::Parse { url, reason }) => {
                warn!(url = %url, reason = %reason, "skipping repository with malformed metadata");
                None
            }
            Err(MetadataError::Fetch(error)) => {
                debug!(repository = %repository, error = %error, "metadata fetch failed");
                None
            }
        }
    }

    /// Download the descriptor (for transitive dependencies) and the
    /// artifact from the given URLs, verify, and install.
    ///
    /// A jar published without a descriptor downloads without children;
    /// repositories drop descriptors for shaded or relocated artifacts and
    /// that must not fail the artifact itself.
    async fn download(
        &self,
        repository: &Url,
        pom_url: &Url,
        jar_url: &Url,
        artifact_path: &Path,
        pom_path: &Path,
    ) -> Result<Vec<ChildDownload>, DownloadError> {
        let mut children = Vec::new();

        if self.dependency.is_transitive() {
            trace!(dependency = %self.dependency, url = %pom_url, "downloading descriptor");
            match self.context.fetcher.project(pom_url).await {
                Ok(Some(fetched)) => {
                    store::write_replace(pom_path, &fetched.bytes).map_err(|error| {
                        DownloadError::Io {
                            path: pom_path.to_path_buf(),
                            reason: error.to_string(),
                        }
                    })?;
                    children = self.expand_transitive(&fetched.project);
                }
                Ok(None) => trace!(dependency = %self.dependency, "descriptor not published"),
                Err(MetadataError::Fetch(FetchError::Connectivity(reason))) => {
                    return Err(DownloadError::Connectivity {
                        url: pom_url.to_string(),
                        reason,
                    });
                }
                Err(error) => {
                    warn!(
                        dependency = %self.dependency,
                        error = %error,
                        "failed to load descriptor, downloading without transitive dependencies"
                    );
                }
            }
        }

        trace!(dependency = %self.dependency, url = %jar_url, "downloading artifact");
        let bytes = match self.context.http.get(jar_url).await {
            Ok(bytes) => Arc::new(bytes),
            Err(error) => {
                debug!(
                    dependency = %self.dependency,
                    repository = %repository,
                    error = %error,
                    "artifact download failed"
                );
                return Err(fetch_failure(jar_url, error));
            }
        };

        self.verify(jar_url, &bytes).await?;

        store::write_replace(artifact_path, &bytes).map_err(|error| DownloadError::Io {
            path: artifact_path.to_path_buf(),
            reason: error.to_string(),
        })?;
        debug!(dependency = %self.dependency, path = %artifact_path.display(), "artifact installed");

        Ok(children)
    }

    /// Verify the downloaded bytes.
    ///
    /// Declared checksums all have to match. Without declared checksums
    /// the repository's sidecars are consulted concurrently: any mismatch
    /// fails, at least one match verifies, and a repository publishing no
    /// sidecars at all is accepted unverified.
    async fn verify(&self, jar_url: &Url, bytes: &Arc<Vec<u8>>) -> Result<(), DownloadError> {
        let declared = self.dependency.checksums();
        if !declared.is_empty() {
            trace!(dependency = %self.dependency, "verifying declared checksums");
            let computations: Vec<_> = declared
                .iter()
                .cloned()
                .map(|expected| {
                    let bytes = Arc::clone(bytes);
                    tokio::task::spawn_blocking(move || {
                        let actual = expected.algo().hex_digest(&bytes);
                        (expected, actual)
                    })
                })
                .collect();

            for handle in join_all(computations).await {
                let (expected, actual) =
                    handle.map_err(|error| DownloadError::Aborted(error.to_string()))?;
                if actual != expected.digest() {
                    return Err(DownloadError::Integrity {
                        algo: expected.algo(),
                        expected: expected.digest().to_string(),
                        actual,
                    });
                }
            }
            return Ok(());
        }

        trace!(dependency = %self.dependency, "fetching remote checksums");
        let fetches = ChecksumAlgo::REMOTE_ORDER
            .map(|algo| checksum::fetch_remote(self.context.http.as_ref(), jar_url, algo));

        let mut verified = false;
        for fetched in join_all(fetches).await {
            match fetched {
                Ok(Some(remote)) => {
                    let actual = remote.algo().hex_digest(bytes.as_slice());
                    if actual == remote.digest() {
                        trace!(dependency = %self.dependency, algo = %remote.algo(), "remote checksum verified");
                        verified = true;
                    } else {
                        return Err(DownloadError::Integrity {
                            algo: remote.algo(),
                            expected: remote.digest().to_string(),
                            actual,
                        });
                    }
                }
                Ok(None) => {}
                Err(error) => {
                    return Err(DownloadError::Connectivity {
                        url: jar_url.to_string(),
                        reason: error.to_string(),
                    });
                }
            }
        }

        if !verified {
            debug!(dependency = %self.dependency, "no checksums published for artifact, accepting unverified");
        }
        Ok(())
    }

    /// Schedule child downloads for the dependencies a descriptor
    /// declares, after publishing its declared repositories to the shared
    /// set.
    fn expand_transitive(&self, project: &Project) -> Vec<ChildDownload> {
        for declared in project.declared_repositories() {
            let Some(raw) = declared.url.as_deref() else {
                continue;
            };
            match Url::parse(raw) {
                Ok(url) => {
                    if self.context.repositories.insert(url.clone()) {
                        debug!(repository = %url, "adding repository declared by descriptor");
                    }
                }
                Err(error) => warn!(
                    url = %raw,
                    dependency = %self.dependency,
                    error = %error,
                    "ignoring malformed repository URL in descriptor"
                ),
            }
        }

        let parent = self.dependency.coordinate();
        let mut children = Vec::new();
        for declared in project.declared_dependencies() {
            let mut view = TransitiveDependency {
                parent: parent.clone(),
                group: declared.group_id.clone().unwrap_or_default(),
                artifact: declared.artifact_id.clone().unwrap_or_default(),
                version: declared.version.clone().unwrap_or_default(),
                classifier: declared.classifier.clone(),
                scope: declared.scope.clone(),
                optional: declared.is_optional(),
                allowed: true,
            };
            for processor in &self.context.processors {
                processor.process(&mut view);
            }
            if !view.allowed {
                trace!(parent = %self.dependency, artifact = %view.artifact, "dependency filtered out");
                continue;
            }
            if !is_relevant_scope(view.scope.as_deref()) {
                continue;
            }

            let group = substitute_project_token(view.group, parent);
            let version = substitute_project_token(view.version, parent);
            let coordinate = match Coordinate::new(group, view.artifact, version) {
                Ok(coordinate) => coordinate,
                Err(error) => {
                    warn!(
                        dependency = %self.dependency,
                        error = %error,
                        "skipping invalid transitive dependency"
                    );
                    continue;
                }
            };
            let coordinate = match view.classifier {
                Some(classifier) => coordinate.with_classifier(classifier),
                None => coordinate,
            };

            debug!(parent = %self.dependency, child = %coordinate, "scheduling transitive dependency");
            let child = Dependency::new(coordinate.clone()).transitive(true);
            let optional = view.optional;
            let future = self.context.registry.get_or_spawn(&coordinate, || {
                DownloadTask::new(Arc::clone(&self.context), child, optional).spawn()
            });
            children.push(ChildDownload { future, optional });
        }
        children
    }
}

/// Join scheduled children in submission order and aggregate their
/// results: failures of optional children are dropped, failures of
/// required children stay visible.
async fn collect_children(children: Vec<ChildDownload>) -> Vec<DownloadResult> {
    let (futures, optionals): (Vec<_>, Vec<_>) = children
        .into_iter()
        .map(|child| (child.future, child.optional))
        .unzip();

    let results = join_all(futures).await;
    results
        .into_iter()
        .zip(optionals)
        .filter_map(|(result, optional)| {
            if !result.is_success() {
                if optional {
                    trace!(dependency = %result.dependency(), "dropping failed optional dependency");
                    return None;
                }
                if let Some(error) = result.error() {
                    trace!(dependency = %result.dependency(), error = %error, "transitive dependency failed");
                }
            }
            Some(result)
        })
        .collect()
}

/// Map a transport failure on an artifact URL into the task taxonomy.
/// 404 and other error statuses mean "this URL does not serve the
/// artifact"; everything else is a repository-level connectivity problem.
fn fetch_failure(url: &Url, error: FetchError) -> DownloadError {
    match error {
        FetchError::NotFound | FetchError::Status(_) => DownloadError::NotFound {
            url: url.to_string(),
        },
        FetchError::Connectivity(reason) | FetchError::Transport(reason) => {
            DownloadError::Connectivity {
                url: url.to_string(),
                reason,
            }
        }
    }
}

/// Resolve the two `${project.*}` tokens the descriptor format allows in
/// `groupId` and `version` against the declaring artifact. Only these two
/// tokens are substituted; general property interpolation is out.
fn substitute_project_token(value: String, parent: &Coordinate) -> String {
    if value.eq_ignore_ascii_case("${project.groupId}") {
        parent.group().to_string()
    } else if value.eq_ignore_ascii_case("${project.version}") {
        parent.version().to_string()
    } else {
        value
    }
}
