//! HTTP client abstraction for testability.
//!
//! The resolver only ever issues GET requests and needs to distinguish
//! "the resource is not there" from "the repository is unreachable". This
//! module fixes that taxonomy in [`FetchError`] and hides the actual
//! transport behind the [`HttpClient`] trait so tests can run against an
//! in-memory transport.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Default timeout for repository requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// User-Agent sent with every repository request.
const USER_AGENT: &str = concat!("mvnfetch/", env!("CARGO_PKG_VERSION"));

/// Transport-level failure taxonomy.
///
/// The resolver's per-repository loop treats these differently: a
/// [`FetchError::NotFound`] triggers fallback within the same repository,
/// a [`FetchError::Connectivity`] moves on to the next repository.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The server answered 404.
    #[error("not found")]
    NotFound,

    /// The repository could not be reached: timeout or connection failure.
    #[error("connection failed: {0}")]
    Connectivity(String),

    /// The server answered with a non-success status other than 404.
    #[error("HTTP status {0}")]
    Status(u16),

    /// Any other transport failure (e.g. the body stream broke off).
    #[error("transport error: {0}")]
    Transport(String),
}

/// Minimal async GET interface over a repository.
///
/// Object-safe so the resolver can hold an `Arc<dyn HttpClient>`; the
/// future is boxed for the same reason.
pub trait HttpClient: Send + Sync + 'static {
    /// GET `url` and read the full response body.
    fn get<'a>(
        &'a self,
        url: &'a Url,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<u8>, FetchError>> + Send + 'a>>;
}

/// Real HTTP client implementation using reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    /// Create a client with the default timeout.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a client with a custom request timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| FetchError::Transport(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

impl HttpClient for ReqwestClient {
    fn get<'a>(
        &'a self,
        url: &'a Url,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<u8>, FetchError>> + Send + 'a>> {
        Box::pin(async move {
            let response = self
                .client
                .get(url.clone())
                .send()
                .await
                .map_err(classify_reqwest_error)?;

            let status = response.status();
            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(FetchError::NotFound);
            }
            if !status.is_success() {
                return Err(FetchError::Status(status.as_u16()));
            }

            response
                .bytes()
                .await
                .map(|b| b.to_vec())
                .map_err(classify_reqwest_error)
        })
    }
}

/// Map a reqwest error into the resolver's taxonomy. Timeouts and
/// connection-level failures (DNS, refused) count as connectivity.
fn classify_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() || err.is_connect() {
        FetchError::Connectivity(err.to_string())
    } else {
        FetchError::Transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_display() {
        assert_eq!(FetchError::NotFound.to_string(), "not found");
        assert_eq!(FetchError::Status(500).to_string(), "HTTP status 500");
        assert_eq!(
            FetchError::Connectivity("dns failure".to_string()).to_string(),
            "connection failed: dns failure"
        );
    }

    #[test]
    fn test_reqwest_client_builds() {
        assert!(ReqwestClient::new().is_ok());
        assert!(ReqwestClient::with_timeout(Duration::from_secs(5)).is_ok());
    }
}
