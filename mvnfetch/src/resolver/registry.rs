//! Bookkeeping for in-flight child downloads.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use futures::future::{join_all, BoxFuture, Shared};

use crate::artifact::Coordinate;
use crate::resolver::result::DownloadResult;

/// The future of one download task.
///
/// Shared so the same task can be joined by its parent, by other parents
/// of the same coordinate, and by the final registry drain. Boxed because
/// a task's future contains the futures of the children it spawns.
pub(crate) type DownloadFuture = Shared<BoxFuture<'static, DownloadResult>>;

/// All child downloads spawned during one resolve run.
///
/// Serves two purposes:
///
/// - the *pending list* guarantees every spawned child is joined before
///   the run returns, even if its parent stopped caring;
/// - the *in-flight map* deduplicates children by coordinate, so a diamond
///   in the dependency graph downloads each artifact once and the parents
///   share the same future. Children are always synthesized the same way
///   (transitive, no declared checksums), which is what makes the
///   coordinate a sufficient key.
///
/// Roots are not registered here; the driver joins them directly.
#[derive(Clone, Default)]
pub(crate) struct TaskRegistry {
    pending: Arc<Mutex<Vec<DownloadFuture>>>,
    in_flight: Arc<Mutex<HashMap<Coordinate, DownloadFuture>>>,
}

impl TaskRegistry {
    /// Look up the in-flight download for `coordinate`, spawning it via
    /// `spawn` if there is none yet. The decision and the registration are
    /// atomic, so two parents racing on the same coordinate get one task.
    pub fn get_or_spawn(
        &self,
        coordinate: &Coordinate,
        spawn: impl FnOnce() -> DownloadFuture,
    ) -> DownloadFuture {
        let mut in_flight = self.in_flight.lock().expect("task registry lock poisoned");
        if let Some(existing) = in_flight.get(coordinate) {
            return existing.clone();
        }

        let future = spawn();
        in_flight.insert(coordinate.clone(), future.clone());
        self.pending
            .lock()
            .expect("task registry lock poisoned")
            .push(future.clone());
        future
    }

    /// Await every registered download. Called once after the roots have
    /// completed; loops in case a drained task registered more work.
    pub async fn drain(&self) {
        loop {
            let pending: Vec<DownloadFuture> = {
                let mut guard = self.pending.lock().expect("task registry lock poisoned");
                guard.drain(..).collect()
            };
            if pending.is_empty() {
                return;
            }
            join_all(pending).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use std::path::PathBuf;

    use crate::artifact::Dependency;

    fn coordinate() -> Coordinate {
        Coordinate::new("org.example", "lib", "1.0").unwrap()
    }

    fn completed(artifact: &str) -> DownloadFuture {
        let dep = Dependency::new(Coordinate::new("org.example", artifact, "1.0").unwrap());
        let result = DownloadResult::success(dep, PathBuf::from("/x"), false, Vec::new());
        async move { result }.boxed().shared()
    }

    #[tokio::test]
    async fn test_get_or_spawn_dedupes() {
        let registry = TaskRegistry::default();
        let mut spawned = 0;

        for _ in 0..3 {
            registry.get_or_spawn(&coordinate(), || {
                spawned += 1;
                completed("lib")
            });
        }

        assert_eq!(spawned, 1);
    }

    #[tokio::test]
    async fn test_distinct_coordinates_spawn_separately() {
        let registry = TaskRegistry::default();
        let other = Coordinate::new("org.example", "other", "1.0").unwrap();
        let mut spawned = 0;

        registry.get_or_spawn(&coordinate(), || {
            spawned += 1;
            completed("lib")
        });
        registry.get_or_spawn(&other, || {
            spawned += 1;
            completed("other")
        });

        assert_eq!(spawned, 2);
    }

    #[tokio::test]
    async fn test_drain_empties_the_registry() {
        let registry = TaskRegistry::default();
        registry.get_or_spawn(&coordinate(), || completed("lib"));

        registry.drain().await;

        assert!(registry.pending.lock().unwrap().is_empty());
    }
}
