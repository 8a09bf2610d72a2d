//! Per-dependency download outcomes.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::artifact::Dependency;
use crate::checksum::ChecksumAlgo;

/// Why a download task failed.
///
/// Every failure a task can hit is encoded here; tasks never panic or
/// propagate errors by unwinding. Results are cloneable because one child
/// outcome can be observed by several parents.
#[derive(Debug, Clone, Error)]
pub enum DownloadError {
    /// A repository could not be reached (timeout, DNS, broken stream).
    #[error("connection to {url} failed: {reason}")]
    Connectivity { url: String, reason: String },

    /// A required resource answered 404 (or another error status).
    #[error("{url} not found")]
    NotFound { url: String },

    /// A metadata or descriptor document was not well-formed XML.
    #[error("malformed document at {url}: {reason}")]
    Parse { url: String, reason: String },

    /// The downloaded bytes did not hash to an expected digest.
    #[error("checksum mismatch ({algo}): expected {expected}, got {actual}")]
    Integrity {
        algo: ChecksumAlgo,
        expected: String,
        actual: String,
    },

    /// The artifact or descriptor could not be written locally.
    #[error("failed to write {}: {reason}", path.display())]
    Io { path: PathBuf, reason: String },

    /// Every repository was tried and none served the artifact.
    #[error("not found in any repository")]
    Exhausted,

    /// The task was torn down before completing (runtime shutdown).
    #[error("download aborted: {0}")]
    Aborted(String),
}

/// The outcome of resolving one dependency, including the outcomes of its
/// transitive dependencies.
///
/// A failed required child does not fail its parent; it stays visible in
/// the parent's [`transitive`](Self::transitive) list so the caller can
/// decide how hard to treat it. Failed optional children are dropped.
#[derive(Debug, Clone)]
pub struct DownloadResult {
    dependency: Dependency,
    artifact_path: PathBuf,
    optional: bool,
    error: Option<DownloadError>,
    transitive: Vec<DownloadResult>,
}

impl DownloadResult {
    pub(crate) fn success(
        dependency: Dependency,
        artifact_path: PathBuf,
        optional: bool,
        transitive: Vec<DownloadResult>,
    ) -> Self {
        Self {
            dependency,
            artifact_path,
            optional,
            error: None,
            transitive,
        }
    }

    pub(crate) fn failure(
        dependency: Dependency,
        artifact_path: PathBuf,
        optional: bool,
        error: DownloadError,
    ) -> Self {
        Self {
            dependency,
            artifact_path,
            optional,
            error: Some(error),
            transitive: Vec::new(),
        }
    }

    /// The dependency this outcome is for.
    pub fn dependency(&self) -> &Dependency {
        &self.dependency
    }

    /// Where the artifact lives (or would live) in the local tree.
    pub fn artifact_path(&self) -> &Path {
        &self.artifact_path
    }

    /// Whether the dependency was requested as optional.
    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// Whether the artifact was downloaded (or already present) and
    /// verified.
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// The failure, if any.
    pub fn error(&self) -> Option<&DownloadError> {
        self.error.as_ref()
    }

    /// Outcomes of transitive dependencies, in declaration order.
    pub fn transitive(&self) -> &[DownloadResult] {
        &self.transitive
    }

    /// Failed outcomes anywhere under this result, depth-first.
    ///
    /// Convenience for callers that treat any transitive failure as fatal.
    pub fn failures(&self) -> Vec<&DownloadResult> {
        let mut failed = Vec::new();
        self.collect_failures(&mut failed);
        failed
    }

    fn collect_failures<'a>(&'a self, into: &mut Vec<&'a DownloadResult>) {
        if !self.is_success() {
            into.push(self);
        }
        for child in &self.transitive {
            child.collect_failures(into);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::Coordinate;

    fn dep(artifact: &str) -> Dependency {
        Dependency::new(Coordinate::new("org.example", artifact, "1.0").unwrap())
    }

    fn ok(artifact: &str, transitive: Vec<DownloadResult>) -> DownloadResult {
        DownloadResult::success(dep(artifact), PathBuf::from("/x"), false, transitive)
    }

    fn fail(artifact: &str) -> DownloadResult {
        DownloadResult::failure(
            dep(artifact),
            PathBuf::from("/x"),
            false,
            DownloadError::Exhausted,
        )
    }

    #[test]
    fn test_success_accessors() {
        let result = ok("lib", vec![]);
        assert!(result.is_success());
        assert!(result.error().is_none());
        assert!(result.transitive().is_empty());
    }

    #[test]
    fn test_failures_walks_the_tree() {
        let tree = ok("root", vec![ok("a", vec![fail("deep")]), fail("b")]);

        let failures = tree.failures();
        let names: Vec<_> = failures
            .iter()
            .map(|r| r.dependency().coordinate().artifact())
            .collect();
        assert_eq!(names, ["deep", "b"]);
    }

    #[test]
    fn test_error_display() {
        let err = DownloadError::Integrity {
            algo: ChecksumAlgo::Sha1,
            expected: "aaaa".to_string(),
            actual: "bbbb".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "checksum mismatch (SHA-1): expected aaaa, got bbbb"
        );
    }
}
