//! `maven-metadata.xml` model.

use serde::Deserialize;

use crate::artifact::SNAPSHOT_SUFFIX;

/// A parsed `maven-metadata.xml`, group- or version-level.
///
/// Group-level metadata resolves which version directory to look in;
/// version-level metadata resolves the timestamped file version of a
/// snapshot. Both use the same document type.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RepositoryMetadata {
    /// `<groupId>`, if present.
    pub group_id: Option<String>,

    /// `<artifactId>`, if present.
    pub artifact_id: Option<String>,

    /// `<version>`, if present.
    pub version: Option<String>,

    /// `<versioning>` block, if present.
    pub versioning: Option<Versioning>,
}

/// The `<versioning>` block of a metadata document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Versioning {
    /// `<latest>`, if present.
    pub latest: Option<String>,

    /// `<release>`, if present.
    pub release: Option<String>,

    /// `<snapshot>` block, if present (version-level metadata only).
    pub snapshot: Option<SnapshotVersion>,
}

/// The `<snapshot>` block naming the current timestamped build.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SnapshotVersion {
    /// `<timestamp>`, e.g. `20240101.120000`.
    pub timestamp: Option<String>,

    /// `<buildNumber>`.
    pub build_number: Option<u32>,
}

impl RepositoryMetadata {
    /// The version directory this metadata points at: the explicit
    /// `<version>`, else `<versioning><latest>`, else `fallback`.
    pub fn resolved_version<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.version
            .as_deref()
            .or_else(|| self.versioning.as_ref().and_then(|v| v.latest.as_deref()))
            .unwrap_or(fallback)
    }

    /// The timestamped file version for a snapshot, if this metadata
    /// carries a complete `<snapshot>` block.
    ///
    /// `1.0-SNAPSHOT` with timestamp `20240101.120000` and build number 3
    /// becomes `1.0-20240101.120000-3`.
    pub fn snapshot_file_version(&self, version: &str) -> Option<String> {
        let snapshot = self.versioning.as_ref()?.snapshot.as_ref()?;
        let timestamp = snapshot.timestamp.as_deref()?;
        let build_number = snapshot.build_number?;
        Some(version.replace(
            SNAPSHOT_SUFFIX,
            &format!("-{timestamp}-{build_number}"),
        ))
    }
}

/// Parse a `maven-metadata.xml` document.
pub fn parse_repository_metadata(bytes: &[u8]) -> Result<RepositoryMetadata, quick_xml::DeError> {
    quick_xml::de::from_reader(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_group_metadata() {
        let meta = parse_repository_metadata(
            br#"<?xml version="1.0" encoding="UTF-8"?>
                <metadata>
                  <groupId>org.example</groupId>
                  <artifactId>lib</artifactId>
                  <versioning>
                    <latest>1.1</latest>
                    <release>1.0</release>
                  </versioning>
                </metadata>"#,
        )
        .unwrap();

        assert_eq!(meta.group_id.as_deref(), Some("org.example"));
        assert_eq!(meta.resolved_version("0.0"), "1.1");
    }

    #[test]
    fn test_parse_snapshot_metadata() {
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

        assert_eq!(
            meta.snapshot_file_version("1.0-SNAPSHOT").as_deref(),
            Some("1.0-20240101.120000-3")
        );
    }

    #[test]
    fn test_explicit_version_wins_over_latest() {
        let meta = parse_repository_metadata(
            br#"<metadata>
                  <version>2.0</version>
                  <versioning><latest>1.1</latest></versioning>
                </metadata>"#,
        )
        .unwrap();

        assert_eq!(meta.resolved_version("0.0"), "2.0");
    }

    #[test]
    fn test_incomplete_snapshot_block_is_ignored() {
        let meta = parse_repository_metadata(
            br#"<metadata>
                  <versioning>
                    <snapshot><timestamp>20240101.120000</timestamp></snapshot>
                  </versioning>
                </metadata>"#,
        )
        .unwrap();

        assert_eq!(meta.snapshot_file_version("1.0-SNAPSHOT"), None);
    }

    #[test]
    fn test_malformed_document_is_an_error() {
        assert!(parse_repository_metadata(b"<metadata><unclosed>").is_err());
        assert!(parse_repository_metadata(b"not xml at all").is_err());
    }

    #[test]
    fn test_resolved_version_falls_back() {
        let meta = RepositoryMetadata::default();
        assert_eq!(meta.resolved_version("1.0"), "1.0");
    }
}
