use crate::snapshot::PlacementSnapshot;
use arc_swap::{ArcSwap, ArcSwapOption};
use std::sync::Arc;
use time::OffsetDateTime;

/// The one shared "current snapshot" reference.
///
/// Clones share the same cell. The refresh loop is its only writer; resolvers read it. A read
/// returns a whole snapshot, either the one before or the one after any concurrent publish, and
/// a reader holding an old snapshot keeps a consistent view of it for as long as it likes.
#[derive(Debug, Clone, Default)]
pub struct SnapshotCell {
    current: Arc<ArcSwap<PlacementSnapshot>>,
    last_refresh: Arc<ArcSwapOption<OffsetDateTime>>,
}

impl SnapshotCell {
    #[must_use]
    pub fn new() -> Self {
        SnapshotCell::default()
    }

    /// The snapshot current at this instant.
    #[must_use]
    pub fn load(&self) -> Arc<PlacementSnapshot> {
        self.current.load_full()
    }

    /// Atomically replace the current snapshot, stamping the time of this successful refresh,
    /// and return the snapshot it superseded.
    pub fn publish(&self, snapshot: PlacementSnapshot) -> Arc<PlacementSnapshot> {
        let previous = self.current.swap(Arc::new(snapshot));
        self.last_refresh
            .store(Some(Arc::new(OffsetDateTime::now_utc())));
        previous
    }

    /// When the current snapshot was published, or `None` before the first successful refresh.
    #[must_use]
    pub fn last_refresh(&self) -> Option<OffsetDateTime> {
        self.last_refresh.load().as_deref().copied()
    }
}
