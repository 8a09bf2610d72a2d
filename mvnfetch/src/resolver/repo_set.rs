//! The shared, growing set of candidate repositories.

use std::sync::{Arc, Mutex};

use url::Url;

/// Repository base URLs for one resolve run.
///
/// The set is seeded from the caller's configuration and grows as
/// descriptors declaring new repositories are parsed; it never shrinks.
/// Iteration order is insertion order, which keeps the per-repository
/// probing loop deterministic.
///
/// Cloning shares the underlying set: an insert through any clone is
/// visible to every task that takes a snapshot afterwards.
#[derive(Debug, Clone, Default)]
pub struct RepositorySet {
    inner: Arc<Mutex<Vec<Url>>>,
}

impl RepositorySet {
    /// Create a set seeded with the given URLs, deduplicated in order.
    pub fn seeded(urls: impl IntoIterator<Item = Url>) -> Self {
        let set = Self::default();
        for url in urls {
            set.insert(url);
        }
        set
    }

    /// Insert a repository URL. Returns `false` if it was already present.
    pub fn insert(&self, url: Url) -> bool {
        let mut urls = self.inner.lock().expect("repository set lock poisoned");
        if urls.contains(&url) {
            return false;
        }
        urls.push(url);
        true
    }

    /// A point-in-time copy of the set, in insertion order.
    ///
    /// Tasks iterate the snapshot so the set can keep growing while a
    /// per-repository loop is underway.
    pub fn snapshot(&self) -> Vec<Url> {
        self.inner
            .lock()
            .expect("repository set lock poisoned")
            .clone()
    }

    /// Number of known repositories.
    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .expect("repository set lock poisoned")
            .len()
    }

    /// Whether no repositories are known.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_seeded_dedupes_in_order() {
        let set = RepositorySet::seeded([
            url("https://r1/"),
            url("https://r2/"),
            url("https://r1/"),
        ]);

        assert_eq!(set.snapshot(), vec![url("https://r1/"), url("https://r2/")]);
    }

    #[test]
    fn test_insert_reports_novelty() {
        let set = RepositorySet::default();
        assert!(set.insert(url("https://r1/")));
        assert!(!set.insert(url("https://r1/")));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_clones_share_state() {
        let set = RepositorySet::seeded([url("https://r1/")]);
        let clone = set.clone();

        clone.insert(url("https://r2/"));

        assert_eq!(set.len(), 2);
        assert_eq!(set.snapshot()[1], url("https://r2/"));
    }

    #[test]
    fn test_snapshot_is_detached() {
        let set = RepositorySet::seeded([url("https://r1/")]);
        let snapshot = set.snapshot();

        set.insert(url("https://r2/"));

        assert_eq!(snapshot.len(), 1);
        assert_eq!(set.len(), 2);
    }
}
