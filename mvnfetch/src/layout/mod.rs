//! Maven 2 repository layout.
//!
//! Pure functions mapping a coordinate to the URLs it lives under in a
//! remote repository and to its path in the local download tree. For any
//! validated [`Coordinate`] these are total; the only failure mode is a
//! repository base URL that does not survive joining, which callers treat
//! as "this repository cannot serve this artifact".
//!
//! Remote layout:
//!
//! ```text
//! {repo}/{group/with/slashes}/{artifact}/maven-metadata.xml
//! {repo}/{group/with/slashes}/{artifact}/{version}/maven-metadata.xml
//! {repo}/{group/with/slashes}/{artifact}/{version}/{artifact}-{file-version}[-{classifier}].{ext}
//! ```
//!
//! The local tree mirrors the remote layout under the download root. For
//! snapshots the *directory* keeps the `-SNAPSHOT` version while the remote
//! *file name* carries the timestamped version from the artifact metadata.

use std::path::{Path, PathBuf};

use thiserror::Error;
use url::Url;

use crate::artifact::Coordinate;
use crate::metadata::RepositoryMetadata;

/// File name of group- and artifact-level repository metadata.
const METADATA_FILE: &str = "maven-metadata.xml";

/// Errors building a URL under a repository base.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// The joined URL did not parse.
    #[error("invalid repository URL: {0}")]
    Url(#[from] url::ParseError),
}

/// The URL of an artifact file, ignoring repository metadata.
///
/// Usable directly for release versions; snapshot files carry a
/// timestamped name that only [`artifact_url`] can compute.
pub fn direct_artifact_url(
    repo: &Url,
    coord: &Coordinate,
    extension: &str,
) -> Result<Url, LayoutError> {
    join(
        repo,
        &format!(
            "{}/{}/{}/{}",
            coord.group_path(),
            coord.artifact(),
            coord.version(),
            coord.file_name(coord.version(), extension)
        ),
    )
}

/// The URL of the group-level `maven-metadata.xml` for an artifact.
pub fn group_metadata_url(repo: &Url, coord: &Coordinate) -> Result<Url, LayoutError> {
    join(
        repo,
        &format!(
            "{}/{}/{}",
            coord.group_path(),
            coord.artifact(),
            METADATA_FILE
        ),
    )
}

/// The URL of the version-level `maven-metadata.xml`, with the version
/// segment resolved through the group metadata.
pub fn artifact_metadata_url(
    repo: &Url,
    group_metadata: &RepositoryMetadata,
    coord: &Coordinate,
) -> Result<Url, LayoutError> {
    join(
        repo,
        &format!(
            "{}/{}/{}/{}",
            coord.group_path(),
            coord.artifact(),
            group_metadata.resolved_version(coord.version()),
            METADATA_FILE
        ),
    )
}

/// The URL of an artifact file, resolved through the artifact metadata.
///
/// For snapshot coordinates the file name substitutes the timestamped
/// snapshot version published in the metadata; the directory segment keeps
/// the `-SNAPSHOT` version. Release coordinates are unaffected by the
/// metadata and get the direct URL.
pub fn artifact_url(
    repo: &Url,
    artifact_metadata: &RepositoryMetadata,
    coord: &Coordinate,
    extension: &str,
) -> Result<Url, LayoutError> {
    let file_version = if coord.is_snapshot() {
        artifact_metadata
            .snapshot_file_version(coord.version())
            .unwrap_or_else(|| coord.version().to_string())
    } else {
        coord.version().to_string()
    };

    join(
        repo,
        &format!(
            "{}/{}/{}/{}",
            coord.group_path(),
            coord.artifact(),
            coord.version(),
            coord.file_name(&file_version, extension)
        ),
    )
}

/// The on-disk location of an artifact under the download root.
pub fn local_artifact_path(root: &Path, coord: &Coordinate, extension: &str) -> PathBuf {
    let mut path = root.to_path_buf();
    for segment in coord.group_path().split('/') {
        path.push(segment);
    }
    path.push(coord.artifact());
    path.push(coord.version());
    path.push(coord.file_name(coord.version(), extension));
    path
}

/// Join a relative artifact path onto a repository base, tolerating bases
/// with and without a trailing slash.
fn join(repo: &Url, relative: &str) -> Result<Url, LayoutError> {
    let base = repo.as_str().trim_end_matches('/');
    Ok(Url::parse(&format!("{base}/{relative}"))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::parse_repository_metadata;

    fn repo() -> Url {
        Url::parse("https://repo.example.org/maven2").unwrap()
    }

    fn coord() -> Coordinate {
        Coordinate::new("org.example.deep", "lib", "1.0").unwrap()
    }

    #[test]
    fn test_direct_artifact_url() {
        let url = direct_artifact_url(&repo(), &coord(), "jar").unwrap();
        assert_eq!(
            url.as_str(),
            "https://repo.example.org/maven2/org/example/deep/lib/1.0/lib-1.0.jar"
        );
    }

    #[test]
    fn test_direct_artifact_url_with_classifier() {
        let coord = coord().with_classifier("sources");
        let url = direct_artifact_url(&repo(), &coord, "jar").unwrap();
        assert_eq!(
            url.as_str(),
            "https://repo.example.org/maven2/org/example/deep/lib/1.0/lib-1.0-sources.jar"
        );
    }

    #[test]
    fn test_trailing_slash_on_base_is_tolerated() {
        let base = Url::parse("https://repo.example.org/maven2/").unwrap();
        let url = direct_artifact_url(&base, &coord(), "pom").unwrap();
        assert_eq!(
            url.as_str(),
            "https://repo.example.org/maven2/org/example/deep/lib/1.0/lib-1.0.pom"
        );
    }

    #[test]
    fn test_group_metadata_url() {
        let url = group_metadata_url(&repo(), &coord()).unwrap();
        assert_eq!(
            url.as_str(),
            "https://repo.example.org/maven2/org/example/deep/lib/maven-metadata.xml"
        );
    }

    #[test]
    fn test_artifact_metadata_url_uses_group_metadata_version() {
        let coord = Coordinate::new("org.example", "lib", "1.0-SNAPSHOT").unwrap();
        let meta = parse_repository_metadata(
            br#"<metadata>
                 <groupId>org.example</groupId>
                 <artifactId>lib</artifactId>
                 <versioning><latest>1.0-SNAPSHOT</latest></versioning>
               </metadata>"#,
        )
        .unwrap();

        let url = artifact_metadata_url(&repo(), &meta, &coord).unwrap();
        assert_eq!(
            url.as_str(),
            "https://repo.example.org/maven2/org/example/lib/1.0-SNAPSHOT/maven-metadata.xml"
        );
    }

    #[test]
    fn test_artifact_url_substitutes_snapshot_version() {
        let coord = Coordinate::new("org.example", "lib", "1.0-SNAPSHOT").unwrap();
        let meta = parse_repository_metadata(
            br#"<metadata>
                 <versioning>
                   <snapshot>
                     <timestamp>20240101.120000</timestamp>
                     <buildNumber>3</buildNumber>
                   </snapshot>
                 </versioning>
               </metadata>"#,
        )
        .unwrap();

        let url = artifact_url(&repo(), &meta, &coord, "jar").unwrap();
        assert_eq!(
            url.as_str(),
            "https://repo.example.org/maven2/org/example/lib/1.0-SNAPSHOT/lib-1.0-20240101.120000-3.jar"
        );
    }

    #[test]
    fn test_artifact_url_for_release_ignores_metadata() {
        let meta = RepositoryMetadata::default();
        let url = artifact_url(&repo(), &meta, &coord(), "jar").unwrap();
        assert_eq!(
            url.as_str(),
            "https://repo.example.org/maven2/org/example/deep/lib/1.0/lib-1.0.jar"
        );
    }

    #[test]
    fn test_local_artifact_path() {
        let path = local_artifact_path(Path::new("/tmp/libs"), &coord(), "jar");
        assert_eq!(
            path,
            Path::new("/tmp/libs/org/example/deep/lib/1.0/lib-1.0.jar")
        );
    }

    #[test]
    fn test_local_artifact_path_keeps_snapshot_version() {
        let coord = Coordinate::new("org.example", "lib", "1.0-SNAPSHOT").unwrap();
        let path = local_artifact_path(Path::new("/tmp/libs"), &coord, "jar");
        assert_eq!(
            path,
            Path::new("/tmp/libs/org/example/lib/1.0-SNAPSHOT/lib-1.0-SNAPSHOT.jar")
        );
    }
}
