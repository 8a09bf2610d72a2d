//! Hooks for rewriting transitive dependencies before download.
//!
//! Every dependency declared by a descriptor is run through the configured
//! processor chain before a child download is scheduled. Processors see a
//! mutable [`TransitiveDependency`] view and may rewrite versions, attach a
//! classifier, or veto the download entirely.

use crate::artifact::Coordinate;

/// Mutable view of one declared dependency, as seen by processors.
///
/// The fields mirror the descriptor's declaration; `group` and `version`
/// may still contain the literal `${project.groupId}` / `${project.version}`
/// tokens at this point (substitution happens after the chain has run, so
/// processors can observe the raw declaration).
#[derive(Debug, Clone)]
pub struct TransitiveDependency {
    /// Coordinate of the artifact whose descriptor declared this dependency.
    pub parent: Coordinate,

    /// Declared group id.
    pub group: String,

    /// Declared artifact id.
    pub artifact: String,

    /// Declared version.
    pub version: String,

    /// Declared classifier, if any.
    pub classifier: Option<String>,

    /// Declared scope; absent means `compile`.
    pub scope: Option<String>,

    /// Whether the declaration was marked `<optional>true</optional>`.
    pub optional: bool,

    /// Whether the dependency will be downloaded. Starts `true`; any
    /// processor may clear it to drop the dependency.
    pub allowed: bool,
}

impl TransitiveDependency {
    /// Mark this dependency as not to be downloaded.
    pub fn deny(&mut self) {
        self.allowed = false;
    }
}

/// A mutating visitor over declared transitive dependencies.
///
/// Processors run in registration order; each sees the edits of the ones
/// before it. Any `Fn(&mut TransitiveDependency)` closure is a processor:
///
/// ```
/// use mvnfetch::artifact::TransitiveDependency;
///
/// // Pin a known-bad version to a fixed one.
/// let pin = |dep: &mut TransitiveDependency| {
///     if dep.artifact == "broken-lib" && dep.version == "2.0" {
///         dep.version = "2.0.1".to_string();
///     }
/// };
/// # let _ = &pin;
/// ```
pub trait TransitiveDependencyProcessor: Send + Sync {
    /// Inspect and possibly rewrite one declared dependency.
    fn process(&self, dependency: &mut TransitiveDependency);
}

impl<F> TransitiveDependencyProcessor for F
where
    F: Fn(&mut TransitiveDependency) + Send + Sync,
{
    fn process(&self, dependency: &mut TransitiveDependency) {
        self(dependency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> TransitiveDependency {
        TransitiveDependency {
            parent: Coordinate::new("org.example", "parent", "1.0").unwrap(),
            group: "org.example".to_string(),
            artifact: "child".to_string(),
            version: "2.0".to_string(),
            classifier: None,
            scope: None,
            optional: false,
            allowed: true,
        }
    }

    #[test]
    fn test_closure_is_a_processor() {
        let rewrite = |dep: &mut TransitiveDependency| {
            dep.version = "2.0.1".to_string();
        };

        let mut dep = view();
        rewrite.process(&mut dep);
        assert_eq!(dep.version, "2.0.1");
    }

    #[test]
    fn test_deny() {
        let mut dep = view();
        assert!(dep.allowed);
        dep.deny();
        assert!(!dep.allowed);
    }

    #[test]
    fn test_chain_sees_prior_edits() {
        let first = |dep: &mut TransitiveDependency| {
            dep.version = "3.0".to_string();
        };
        let second = |dep: &mut TransitiveDependency| {
            if dep.version == "3.0" {
                dep.deny();
            }
        };

        let mut dep = view();
        for processor in [&first as &dyn TransitiveDependencyProcessor, &second] {
            processor.process(&mut dep);
        }
        assert!(!dep.allowed);
    }
}
