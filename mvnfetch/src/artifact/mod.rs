//! Artifact identity types.
//!
//! The [`Coordinate`] struct is the essential identity of an artifact,
//! shared across all contexts: URL construction, local-path layout, and
//! resolver bookkeeping. A [`Dependency`] wraps a coordinate with the
//! download-time attributes the resolver needs (transitive expansion and
//! declared checksums).

mod processor;

pub use processor::{TransitiveDependency, TransitiveDependencyProcessor};

use std::fmt;

use thiserror::Error;

use crate::checksum::ArtifactChecksum;

/// Version suffix marking an artifact as a snapshot.
pub const SNAPSHOT_SUFFIX: &str = "-SNAPSHOT";

/// Errors raised when constructing a coordinate from invalid parts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordinateError {
    /// The group id was empty.
    #[error("group id cannot be empty")]
    EmptyGroup,

    /// The artifact id was empty.
    #[error("artifact id cannot be empty")]
    EmptyArtifact,

    /// The version was empty.
    #[error("version cannot be empty")]
    EmptyVersion,
}

/// Identity of a single artifact: `(group, artifact, version, classifier?)`.
///
/// Coordinates are immutable after construction and validated to have
/// non-empty group, artifact and version, which makes every URL and path
/// derived from them well-formed by construction.
///
/// # Example
///
/// ```
/// use mvnfetch::artifact::Coordinate;
///
/// let coord = Coordinate::new("org.example", "lib", "1.0").unwrap();
///
/// assert_eq!(coord.group(), "org.example");
/// assert!(!coord.is_snapshot());
/// assert_eq!(coord.to_string(), "org.example:lib:1.0");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Coordinate {
    group: String,
    artifact: String,
    version: String,
    classifier: Option<String>,
}

impl Coordinate {
    /// Create a new coordinate without a classifier.
    ///
    /// # Errors
    ///
    /// Returns a [`CoordinateError`] if any of the three parts is empty.
    pub fn new(
        group: impl Into<String>,
        artifact: impl Into<String>,
        version: impl Into<String>,
    ) -> Result<Self, CoordinateError> {
        let group = group.into();
        let artifact = artifact.into();
        let version = version.into();

        if group.is_empty() {
            return Err(CoordinateError::EmptyGroup);
        }
        if artifact.is_empty() {
            return Err(CoordinateError::EmptyArtifact);
        }
        if version.is_empty() {
            return Err(CoordinateError::EmptyVersion);
        }

        Ok(Self {
            group,
            artifact,
            version,
            classifier: None,
        })
    }

    /// Attach a classifier (e.g. `sources`, `natives-linux`).
    ///
    /// An empty classifier is treated as absent, which is how descriptors
    /// express "no classifier".
    pub fn with_classifier(mut self, classifier: impl Into<String>) -> Self {
        let classifier = classifier.into();
        self.classifier = if classifier.is_empty() {
            None
        } else {
            Some(classifier)
        };
        self
    }

    /// The group id, e.g. `org.example`.
    pub fn group(&self) -> &str {
        &self.group
    }

    /// The artifact id, e.g. `lib`.
    pub fn artifact(&self) -> &str {
        &self.artifact
    }

    /// The version string. Opaque except for the snapshot suffix.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// The optional classifier.
    pub fn classifier(&self) -> Option<&str> {
        self.classifier.as_deref()
    }

    /// Whether this coordinate names a snapshot version.
    ///
    /// Snapshots cannot be fetched directly; their timestamped file name
    /// has to be resolved through repository metadata first.
    pub fn is_snapshot(&self) -> bool {
        self.version.ends_with(SNAPSHOT_SUFFIX)
    }

    /// The group id with dots replaced by slashes, as used in repository
    /// and local-tree paths.
    pub fn group_path(&self) -> String {
        self.group.replace('.', "/")
    }

    /// The artifact file name for the given extension, using `version` as
    /// the version part of the name.
    ///
    /// The version is a parameter because snapshot downloads use a
    /// timestamped file version inside a `-SNAPSHOT` directory.
    pub fn file_name(&self, file_version: &str, extension: &str) -> String {
        match &self.classifier {
            Some(classifier) => format!(
                "{}-{}-{}.{}",
                self.artifact, file_version, classifier, extension
            ),
            None => format!("{}-{}.{}", self.artifact, file_version, extension),
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.artifact, self.version)?;
        if let Some(classifier) = &self.classifier {
            write!(f, ":{}", classifier)?;
        }
        Ok(())
    }
}

/// A downloadable dependency: a coordinate plus download attributes.
///
/// Roots are created by the caller; transitive dependencies are synthesized
/// by the resolver with `transitive = true` and no declared checksums.
///
/// # Example
///
/// ```
/// use mvnfetch::artifact::{Coordinate, Dependency};
///
/// let coord = Coordinate::new("org.example", "lib", "1.0").unwrap();
/// let dep = Dependency::new(coord).transitive(true);
///
/// assert!(dep.is_transitive());
/// assert!(dep.checksums().is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    coordinate: Coordinate,
    transitive: bool,
    checksums: Vec<ArtifactChecksum>,
}

impl Dependency {
    /// Create a non-transitive dependency with no declared checksums.
    pub fn new(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            transitive: false,
            checksums: Vec::new(),
        }
    }

    /// Toggle transitive expansion for this dependency.
    pub fn transitive(mut self, transitive: bool) -> Self {
        self.transitive = transitive;
        self
    }

    /// Declare a checksum the downloaded artifact must match.
    ///
    /// When at least one checksum is declared, remote sidecar checksums are
    /// not consulted; every declared checksum must match.
    pub fn with_checksum(mut self, checksum: ArtifactChecksum) -> Self {
        self.checksums.push(checksum);
        self
    }

    /// The artifact coordinate.
    pub fn coordinate(&self) -> &Coordinate {
        &self.coordinate
    }

    /// Whether declared dependencies of this artifact are downloaded too.
    pub fn is_transitive(&self) -> bool {
        self.transitive
    }

    /// The declared checksums, possibly empty.
    pub fn checksums(&self) -> &[ArtifactChecksum] {
        &self.checksums
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.coordinate, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_new() {
        let coord = Coordinate::new("org.example", "lib", "1.0").unwrap();

        assert_eq!(coord.group(), "org.example");
        assert_eq!(coord.artifact(), "lib");
        assert_eq!(coord.version(), "1.0");
        assert_eq!(coord.classifier(), None);
    }

    #[test]
    fn test_coordinate_rejects_empty_parts() {
        assert_eq!(
            Coordinate::new("", "lib", "1.0"),
            Err(CoordinateError::EmptyGroup)
        );
        assert_eq!(
            Coordinate::new("org.example", "", "1.0"),
            Err(CoordinateError::EmptyArtifact)
        );
        assert_eq!(
            Coordinate::new("org.example", "lib", ""),
            Err(CoordinateError::EmptyVersion)
        );
    }

    #[test]
    fn test_coordinate_snapshot_detection() {
        let release = Coordinate::new("org.example", "lib", "1.0").unwrap();
        let snapshot = Coordinate::new("org.example", "lib", "1.0-SNAPSHOT").unwrap();

        assert!(!release.is_snapshot());
        assert!(snapshot.is_snapshot());
    }

    #[test]
    fn test_coordinate_group_path() {
        let coord = Coordinate::new("org.example.deep", "lib", "1.0").unwrap();
        assert_eq!(coord.group_path(), "org/example/deep");
    }

    #[test]
    fn test_coordinate_file_name() {
        let coord = Coordinate::new("org.example", "lib", "1.0").unwrap();
        assert_eq!(coord.file_name("1.0", "jar"), "lib-1.0.jar");

        let classified = coord.clone().with_classifier("sources");
        assert_eq!(
            classified.file_name("1.0", "jar"),
            "lib-1.0-sources.jar"
        );
    }

    #[test]
    fn test_coordinate_empty_classifier_is_absent() {
        let coord = Coordinate::new("org.example", "lib", "1.0")
            .unwrap()
            .with_classifier("");
        assert_eq!(coord.classifier(), None);
    }

    #[test]
    fn test_coordinate_display() {
        let coord = Coordinate::new("org.example", "lib", "1.0").unwrap();
        assert_eq!(coord.to_string(), "org.example:lib:1.0");

        let classified = coord.with_classifier("sources");
        assert_eq!(classified.to_string(), "org.example:lib:1.0:sources");
    }

    #[test]
    fn test_dependency_defaults() {
        let coord = Coordinate::new("org.example", "lib", "1.0").unwrap();
        let dep = Dependency::new(coord);

        assert!(!dep.is_transitive());
        assert!(dep.checksums().is_empty());
    }
}
