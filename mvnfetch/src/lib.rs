//! mvnfetch - lightweight artifact resolution for Maven-style repositories.
//!
//! Given root artifact coordinates and a list of candidate repositories,
//! the resolver locates each artifact, downloads and checksum-verifies it,
//! recursively expands the transitive dependencies its descriptor
//! declares, and installs everything into a local directory tree laid out
//! like the remote repository. Outcomes are reported per root as
//! structured [`DownloadResult`] trees; nothing panics or unwinds across a
//! download.
//!
//! The entry point is [`resolver::Resolver`]. The supporting modules are
//! usable on their own: [`layout`] for the repository URL/path scheme,
//! [`metadata`] for `maven-metadata.xml` / `pom.xml` documents,
//! [`checksum`] for digest handling, and [`http`] for the transport
//! abstraction.

pub mod artifact;
pub mod checksum;
pub mod http;
pub mod layout;
pub mod metadata;
pub mod resolver;
pub mod store;

pub use artifact::{Coordinate, Dependency};
pub use checksum::{ArtifactChecksum, ChecksumAlgo};
pub use resolver::{DownloadError, DownloadResult, Resolver};
