//! `pom.xml` project descriptor model.

use serde::Deserialize;

/// Scopes whose dependencies are downloaded. An absent or empty scope
/// counts as `compile`; `test`, `provided`, `system` and `import` are
/// dropped.
const RELEVANT_SCOPES: [&str; 3] = ["", "compile", "runtime"];

/// A parsed project descriptor, reduced to the elements the resolver
/// consumes.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Project {
    /// `<groupId>`, if present.
    pub group_id: Option<String>,

    /// `<artifactId>`, if present.
    pub artifact_id: Option<String>,

    /// `<version>`, if present.
    pub version: Option<String>,

    /// `<repositories>` block.
    repositories: Repositories,

    /// `<dependencies>` block.
    dependencies: Dependencies,
}

impl Project {
    /// The declared repositories, in document order.
    pub fn declared_repositories(&self) -> &[DeclaredRepository] {
        &self.repositories.entries
    }

    /// The declared dependencies, in document order.
    pub fn declared_dependencies(&self) -> &[DeclaredDependency] {
        &self.dependencies.entries
    }
}

/// The `<repositories>` wrapper element.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Repositories {
    #[serde(default, rename = "repository")]
    entries: Vec<DeclaredRepository>,
}

/// One `<repository>` declaration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeclaredRepository {
    /// `<id>`, if present.
    pub id: Option<String>,

    /// `<url>`, if present. Not validated here; the resolver parses it
    /// and skips declarations that do not form a URL.
    pub url: Option<String>,
}

/// The `<dependencies>` wrapper element.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Dependencies {
    #[serde(default, rename = "dependency")]
    entries: Vec<DeclaredDependency>,
}

/// One `<dependency>` declaration.
///
/// `group_id` and `version` may be the literal `${project.groupId}` /
/// `${project.version}` tokens; substitution against the declaring
/// artifact is the resolver's job.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeclaredDependency {
    /// `<groupId>`.
    pub group_id: Option<String>,

    /// `<artifactId>`.
    pub artifact_id: Option<String>,

    /// `<version>`.
    pub version: Option<String>,

    /// `<classifier>`.
    pub classifier: Option<String>,

    /// `<scope>`.
    pub scope: Option<String>,

    /// `<optional>`, textual `true`/`false`.
    pub optional: Option<String>,
}

impl DeclaredDependency {
    /// Whether the declaration is marked optional.
    pub fn is_optional(&self) -> bool {
        self.optional
            .as_deref()
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
    }
}

/// Whether a declared scope participates in transitive resolution.
pub fn is_relevant_scope(scope: Option<&str>) -> bool {
    RELEVANT_SCOPES.contains(&scope.unwrap_or(""))
}

/// Parse a `pom.xml` document.
pub fn parse_project(bytes: &[u8]) -> Result<Project, quick_xml::DeError> {
    quick_xml::de::from_reader(bytes)
}
