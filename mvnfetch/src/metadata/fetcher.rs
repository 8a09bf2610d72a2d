//! Fetching and parsing of metadata and descriptor documents.

use std::sync::Arc;

use thiserror::Error;
use tracing::trace;
use url::Url;

use crate::http::{FetchError, HttpClient};
use crate::metadata::model::{parse_repository_metadata, RepositoryMetadata};
use crate::metadata::pom::{parse_project, Project};

/// Failure fetching or parsing a repository document.
///
/// The two cases carry different policies in the resolver: a fetch
/// failure follows the transport taxonomy (retry next repository on
/// connectivity, fall back on 404), a parse failure skips the offending
/// document.
#[derive(Debug, Clone, Error)]
pub enum MetadataError {
    /// The document could not be fetched.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The document was fetched but is not well-formed XML.
    #[error("malformed document at {url}: {reason}")]
    Parse { url: String, reason: String },
}

/// A fetched project descriptor: the parsed model plus the raw bytes,
/// so the descriptor can be persisted verbatim and re-read from disk.
#[derive(Debug, Clone)]
pub struct FetchedProject {
    /// The raw document as served by the repository.
    pub bytes: Vec<u8>,

    /// The parsed model.
    pub project: Project,
}

/// Fetches `maven-metadata.xml` and `pom.xml` documents over an
/// [`HttpClient`].
#[derive(Clone)]
pub struct MetadataFetcher {
    http: Arc<dyn HttpClient>,
}

impl MetadataFetcher {
    /// Create a fetcher over the given transport.
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self { http }
    }

    /// Fetch and parse a group-level `maven-metadata.xml`.
    ///
    /// Returns `Ok(None)` when the repository has no metadata for the
    /// artifact (404).
    pub async fn group_metadata(
        &self,
        url: &Url,
    ) -> Result<Option<RepositoryMetadata>, MetadataError> {
        self.metadata(url).await
    }

    /// Fetch and parse a version-level `maven-metadata.xml`.
    pub async fn artifact_metadata(
        &self,
        url: &Url,
    ) -> Result<Option<RepositoryMetadata>, MetadataError> {
        self.metadata(url).await
    }

    /// Fetch and parse a project descriptor.
    pub async fn project(&self, url: &Url) -> Result<Option<FetchedProject>, MetadataError> {
        trace!(url = %url, "fetching project descriptor");
        let bytes = match self.http.get(url).await {
            Ok(bytes) => bytes,
            Err(FetchError::NotFound) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let project = parse_project(&bytes).map_err(|e| MetadataError::Parse {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Some(FetchedProject { bytes, project }))
    }

    async fn metadata(&self, url: &Url) -> Result<Option<RepositoryMetadata>, MetadataError> {
        trace!(url = %url, "fetching repository metadata");
        let bytes = match self.http.get(url).await {
            Ok(bytes) => bytes,
            Err(FetchError::NotFound) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        parse_repository_metadata(&bytes)
            .map(Some)
            .map_err(|e| MetadataError::Parse {
                url: url.to_string(),
                reason: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::Future;
    use std::pin::Pin;

    /// Transport serving one fixed response for every URL.
    struct StaticClient(Result<Vec<u8>, FetchError>);

    impl HttpClient for StaticClient {
        fn get<'a>(
            &'a self,
            _url: &'a Url,
        ) -> Pin<Box<dyn Future<Output = Result<Vec<u8>, FetchError>> + Send + 'a>> {
            let response = self.0.clone();
            Box::pin(async move { response })
        }
    }

    fn fetcher(response: Result<Vec<u8>, FetchError>) -> MetadataFetcher {
        MetadataFetcher::new(Arc::new(StaticClient(response)))
    }

    fn url() -> Url {
        Url::parse("https://repo/org/example/lib/maven-metadata.xml").unwrap()
    }

    #[tokio::test]
    async fn test_group_metadata_absent_on_404() {
        let fetcher = fetcher(Err(FetchError::NotFound));
        let result = fetcher.group_metadata(&url()).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_group_metadata_parses() {
        let fetcher = fetcher(Ok(
            b"<metadata><version>1.0</version></metadata>".to_vec()
        ));
        let meta = fetcher.group_metadata(&url()).await.unwrap().unwrap();
        assert_eq!(meta.version.as_deref(), Some("1.0"));
    }

    #[tokio::test]
    async fn test_connectivity_error_propagates() {
        let fetcher = fetcher(Err(FetchError::Connectivity("timed out".to_string())));
        let err = fetcher.group_metadata(&url()).await.unwrap_err();
        assert!(matches!(
            err,
            MetadataError::Fetch(FetchError::Connectivity(_))
        ));
    }

    #[tokio::test]
    async fn test_malformed_metadata_is_a_parse_error() {
        let fetcher = fetcher(Ok(b"<metadata><unclosed>".to_vec()));
        let err = fetcher.group_metadata(&url()).await.unwrap_err();
        assert!(matches!(err, MetadataError::Parse { .. }));
    }

    #[tokio::test]
    async fn test_project_carries_raw_bytes() {
        let body = b"<project><artifactId>lib</artifactId></project>".to_vec();
        let fetcher = fetcher(Ok(body.clone()));
        let fetched = fetcher.project(&url()).await.unwrap().unwrap();

        assert_eq!(fetched.bytes, body);
        assert_eq!(fetched.project.artifact_id.as_deref(), Some("lib"));
    }
}
