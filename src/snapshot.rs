use std::{
    cell::RefCell,
    sync::Arc,
    time::{Duration, Instant},
};

use tracing::trace;

/// How long a materialized view of the queue stays valid when nothing mutates the queue.
pub const DEFAULT_SNAPSHOT_TTL: Duration = Duration::from_millis(100);

/// Controls the read-side snapshot cache of a [`BoundedQueue`](crate::BoundedQueue).
///
/// The cache only affects latency. Every mutation invalidates it, so reads return the same
/// results whichever policy is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SnapshotPolicy {
    /// Every read walks the live window.
    Disabled,
    /// Materialized views are reused for at most this long.
    Ttl(Duration),
}

impl Default for SnapshotPolicy {
    fn default() -> Self {
        Self::Ttl(DEFAULT_SNAPSHOT_TTL)
    }
}

/// Identifies the queue state a snapshot was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SnapshotKey {
    pub generation: u64,
    pub head: usize,
    pub len: usize,
}

enum State<T> {
    Invalid,
    Cached {
        items: Arc<[T]>,
        key: SnapshotKey,
        taken_at: Instant,
    },
}

pub(crate) struct Snapshots<T> {
    policy: SnapshotPolicy,
    state: RefCell<State<T>>,
}

impl<T> Snapshots<T> {
    pub fn new(policy: SnapshotPolicy) -> Self {
        Self {
            policy,
            state: RefCell::new(State::Invalid),
        }
    }

    pub fn policy(&self) -> SnapshotPolicy {
        self.policy
    }

    /// Drops the cached view. Called by every mutation before it returns.
    #[inline]
    pub fn invalidate(&mut self) {
        *self.state.get_mut() = State::Invalid;
    }

    /// Returns the cached view only if it was taken from exactly the state `key` describes
    /// and has not outlived the TTL.
    fn validated(&self, state: &State<T>, key: SnapshotKey) -> Option<Arc<[T]>> {
        let SnapshotPolicy::Ttl(ttl) = self.policy else {
            return None;
        };
        match state {
            State::Cached {
                items,
                key: cached,
                taken_at,
            } if *cached == key && items.len() == key.len && taken_at.elapsed() < ttl => {
                Some(Arc::clone(items))
            }
            _ => None,
        }
    }

    /// Runs `f` over the cached view, if there is a valid one.
    pub fn with_valid<R>(&self, key: SnapshotKey, f: impl FnOnce(&[T]) -> R) -> Option<R> {
        let items = self.validated(&self.state.borrow(), key)?;
        Some(f(&items))
    }

    pub fn get_or_insert_with(
        &self,
        key: SnapshotKey,
        build: impl FnOnce() -> Arc<[T]>,
    ) -> Arc<[T]> {
        if let Some(items) = self.validated(&self.state.borrow(), key) {
            return items;
        }

        let items = build();
        debug_assert_eq!(items.len(), key.len);
        if let SnapshotPolicy::Ttl(_) = self.policy {
            trace!(
                len = key.len,
                generation = key.generation,
                "rebuilt queue snapshot"
            );
            *self.state.borrow_mut() = State::Cached {
                items: Arc::clone(&items),
                key,
                taken_at: Instant::now(),
            };
        }
        items
    }

    #[cfg(test)]
    pub fn is_cached(&self) -> bool {
        matches!(*self.state.borrow(), State::Cached { .. })
    }
}

impl<T> Clone for Snapshots<T> {
    /// A clone starts with an empty cache; views are never shared between queues.
    fn clone(&self) -> Self {
        Self::new(self.policy)
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, thread::sleep};

    use super::*;

    const KEY: SnapshotKey = SnapshotKey {
        generation: 3,
        head: 1,
        len: 2,
    };

    fn counting_build<'a>(calls: &'a Cell<usize>) -> impl FnOnce() -> Arc<[i32]> + 'a {
        move || {
            calls.set(calls.get() + 1);
            Arc::from([7, 8])
        }
    }

    #[test]
    fn test_reuses_valid_snapshot() {
        let calls = Cell::new(0);
        let snapshots = Snapshots::new(SnapshotPolicy::Ttl(Duration::from_secs(60)));

        let first = snapshots.get_or_insert_with(KEY, counting_build(&calls));
        let second = snapshots.get_or_insert_with(KEY, counting_build(&calls));
        assert_eq!(calls.get(), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(snapshots.with_valid(KEY, |items| items.to_vec()), Some(vec![7, 8]));
    }

    #[test]
    fn test_rejects_mismatched_key() {
        let calls = Cell::new(0);
        let snapshots = Snapshots::new(SnapshotPolicy::Ttl(Duration::from_secs(60)));
        snapshots.get_or_insert_with(KEY, counting_build(&calls));

        let moved = SnapshotKey { head: 2, ..KEY };
        let newer = SnapshotKey {
            generation: 4,
            ..KEY
        };
        assert_eq!(snapshots.with_valid(moved, |_| ()), None);
        assert_eq!(snapshots.with_valid(newer, |_| ()), None);

        snapshots.get_or_insert_with(newer, counting_build(&calls));
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_rejects_wrong_length() {
        let snapshots = Snapshots::<i32>::new(SnapshotPolicy::Ttl(Duration::from_secs(60)));
        snapshots.get_or_insert_with(KEY, || Arc::from([7, 8]));

        // Same generation and head but a different window length can never be trusted.
        let longer = SnapshotKey { len: 3, ..KEY };
        assert_eq!(snapshots.with_valid(longer, |_| ()), None);
    }

    #[test]
    fn test_expires() {
        let calls = Cell::new(0);
        let snapshots = Snapshots::new(SnapshotPolicy::Ttl(Duration::from_millis(1)));
        snapshots.get_or_insert_with(KEY, counting_build(&calls));
        sleep(Duration::from_millis(5));
        assert_eq!(snapshots.with_valid(KEY, |_| ()), None);
        snapshots.get_or_insert_with(KEY, counting_build(&calls));
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_invalidate() {
        let mut snapshots = Snapshots::<i32>::new(SnapshotPolicy::default());
        snapshots.get_or_insert_with(KEY, || Arc::from([7, 8]));
        assert!(snapshots.is_cached());
        snapshots.invalidate();
        assert!(!snapshots.is_cached());
        assert_eq!(snapshots.with_valid(KEY, |_| ()), None);
    }

    #[test]
    fn test_disabled_never_caches() {
        let calls = Cell::new(0);
        let snapshots = Snapshots::new(SnapshotPolicy::Disabled);
        snapshots.get_or_insert_with(KEY, counting_build(&calls));
        snapshots.get_or_insert_with(KEY, counting_build(&calls));
        assert_eq!(calls.get(), 2);
        assert!(!snapshots.is_cached());
    }

    #[test]
    fn test_clone_starts_empty() {
        let snapshots = Snapshots::<i32>::new(SnapshotPolicy::default());
        snapshots.get_or_insert_with(KEY, || Arc::from([7, 8]));
        let cloned = snapshots.clone();
        assert!(!cloned.is_cached());
        assert_eq!(cloned.policy(), snapshots.policy());
    }
}
