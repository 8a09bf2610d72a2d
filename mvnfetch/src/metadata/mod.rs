//! Repository metadata and project descriptor documents.
//!
//! Models for the two XML document kinds the resolver consumes:
//! `maven-metadata.xml` (group- and version-level, used to resolve
//! snapshot file versions) and `pom.xml` (used to discover declared
//! repositories and transitive dependencies). Only the elements the
//! resolver acts on are modeled; everything else in the documents is
//! ignored.

mod fetcher;
mod model;
mod pom;

pub use fetcher::{FetchedProject, MetadataError, MetadataFetcher};
pub use model::{parse_repository_metadata, RepositoryMetadata, SnapshotVersion, Versioning};
pub use pom::{
    is_relevant_scope, parse_project, DeclaredDependency, DeclaredRepository, Project,
};
