//! A fixed-size queue that keeps the most recent items pushed into it, evicting the oldest
//! item once the requested bound is reached.
//!
//! The backing storage is rounded up to a power of two so that every wraparound is a bit-mask,
//! while eviction always respects the bound the caller asked for.

pub mod capacity;
pub mod config;
pub mod error;
pub mod iter;
mod pos;
pub mod snapshot;

use std::{
    fmt::{Debug, Formatter},
    hash::{Hash, Hasher},
    sync::Arc,
};

use tracing::debug;

pub use self::{
    capacity::{Capacity, MAX_CAPACITY},
    config::QueueConfig,
    error::InvalidCapacity,
    iter::{Drain, IntoIter, Iter},
    snapshot::{SnapshotPolicy, DEFAULT_SNAPSHOT_TTL},
};

use self::{
    iter::live,
    pos::Pos,
    snapshot::{SnapshotKey, Snapshots},
};

/// Queue holding at most [`max_size`](Self::max_size) items, dropping the oldest item on overflow.
///
/// The queue is a single-writer structure: every mutation takes `&mut self`, and it is not `Sync`.
/// Share it between threads behind a `Mutex` or hand it to a single owning task.
pub struct BoundedQueue<T> {
    // Invariant: every slot inside the window described by `pos` is `Some`.
    // Slots outside the window are `None` and are never read.
    buf: Box<[Option<T>]>,
    pos: Pos,
    cap: Capacity,
    // Bumped by every mutation, so snapshots taken before it can be told apart.
    generation: u64,
    snapshots: Snapshots<T>,
}

impl<T> BoundedQueue<T> {
    /// Creates an empty queue holding at most `max_size` items, with the default snapshot cache.
    ///
    /// # Examples
    /// ```
    /// # use bounded_queue::{BoundedQueue, InvalidCapacity};
    /// let queue = BoundedQueue::<u32>::new(5).unwrap();
    /// assert_eq!(queue.max_size(), 5);
    /// assert_eq!(queue.capacity(), 8);
    ///
    /// assert!(BoundedQueue::<u32>::new(0).is_err());
    /// assert_eq!(
    ///     BoundedQueue::<u32>::new(-5).unwrap_err(),
    ///     InvalidCapacity::NotPositive { requested: -5 }
    /// );
    /// ```
    pub fn new<N: TryInto<i64>>(max_size: N) -> Result<Self, InvalidCapacity> {
        Self::with_policy(max_size, SnapshotPolicy::default())
    }

    /// Creates an empty queue holding at most `max_size` items, using the given snapshot policy.
    pub fn with_policy<N: TryInto<i64>>(
        max_size: N,
        policy: SnapshotPolicy,
    ) -> Result<Self, InvalidCapacity> {
        Ok(Self::from_capacity(Capacity::normalize(max_size)?, policy))
    }

    /// Creates an empty queue from an already validated [`Capacity`].
    pub fn from_capacity(cap: Capacity, policy: SnapshotPolicy) -> Self {
        let buf = std::iter::repeat_with(|| None)
            .take(cap.capacity())
            .collect();
        debug!(
            max_size = cap.max_size(),
            capacity = cap.capacity(),
            ?policy,
            "created bounded queue"
        );
        Self {
            buf,
            pos: Pos::zero(cap.mask()),
            cap,
            generation: 0,
            snapshots: Snapshots::new(policy),
        }
    }

    /// Returns the number of items in the queue.
    pub const fn len(&self) -> usize {
        self.pos.len()
    }

    /// Returns `true` if the queue is empty.
    pub const fn is_empty(&self) -> bool {
        self.pos.is_empty()
    }

    /// Returns `true` if the next push will evict the oldest item.
    pub const fn is_full(&self) -> bool {
        self.len() == self.cap.max_size()
    }

    /// Returns the number of items that can be pushed before the queue starts evicting.
    ///
    /// Same as `self.max_size() - self.len()`.
    pub const fn remaining(&self) -> usize {
        self.cap.max_size() - self.len()
    }

    /// The bound on the number of items held, as requested at construction.
    pub const fn max_size(&self) -> usize {
        self.cap.max_size()
    }

    /// The size of the internal allocation. For diagnostics only: it may be larger than
    /// [`max_size`](Self::max_size), and the queue never holds more than `max_size` items.
    pub const fn capacity(&self) -> usize {
        self.cap.capacity()
    }

    pub fn snapshot_policy(&self) -> SnapshotPolicy {
        self.snapshots.policy()
    }

    /// Returns a reference to the item at the given index, 0 being the oldest, or `None` if the
    /// index is out of bounds.
    ///
    /// # Examples
    /// ```
    /// # use bounded_queue::BoundedQueue;
    /// let mut queue = BoundedQueue::new(2).unwrap();
    /// queue.extend([1, 2, 3]);
    /// assert_eq!(queue.get(0), Some(&2));
    /// assert_eq!(queue.get(1), Some(&3));
    /// assert_eq!(queue.get(2), None);
    /// ```
    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.len() {
            None
        } else {
            Some(live(&self.buf, self.pos.logical_index(index)))
        }
    }

    /// Returns the oldest item without removing it, or `None` if the queue is empty.
    pub fn peek(&self) -> Option<&T> {
        if self.is_empty() {
            return None;
        }
        Some(live(&self.buf, self.pos.head()))
    }

    /// Returns the most recently pushed item, or `None` if the queue is empty.
    ///
    /// # Examples
    /// ```
    /// # use bounded_queue::BoundedQueue;
    /// let mut queue = BoundedQueue::new(3).unwrap();
    /// assert_eq!(queue.peek_last(), None);
    /// queue.extend([1, 2, 3, 4]);
    /// assert_eq!(queue.peek(), Some(&2));
    /// assert_eq!(queue.peek_last(), Some(&4));
    /// ```
    pub fn peek_last(&self) -> Option<&T> {
        if self.is_empty() {
            return None;
        }
        Some(live(&self.buf, self.pos.last_index()))
    }

    /// Removes the oldest item from the queue and returns it, or `None` if the queue is empty.
    ///
    /// # Examples
    /// ```
    /// # use bounded_queue::BoundedQueue;
    /// let mut queue = BoundedQueue::new(3).unwrap();
    /// assert_eq!(queue.pop(), None);
    /// queue.extend([0, 1]);
    /// assert_eq!(queue.pop(), Some(0));
    /// assert_eq!(queue.pop(), Some(1));
    /// assert_eq!(queue.pop(), None);
    /// ```
    pub fn pop(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }

        let index = self.pos.pop_front();
        let item = self.buf[index].take();
        debug_assert!(item.is_some());
        self.mutated();
        item
    }

    /// Adds an item to the end of the queue, removing the oldest item if the queue
    /// [is full](Self::is_full). Returns the removed item, if any.
    ///
    /// # Examples
    /// ```
    /// # use bounded_queue::BoundedQueue;
    /// let mut queue = BoundedQueue::new(3).unwrap();
    /// assert_eq!(queue.pop_push(0), None);
    /// assert_eq!(queue.pop_push(1), None);
    /// assert_eq!(queue.pop_push(2), None);
    /// assert_eq!(queue, [0, 1, 2]);
    /// assert_eq!(queue.pop_push(3), Some(0));
    /// assert_eq!(queue, [1, 2, 3]);
    /// ```
    pub fn pop_push(&mut self, item: T) -> Option<T> {
        // gated on `max_size`, never on the rounded-up capacity
        let evicted = if self.is_full() {
            let index = self.pos.pop_front();
            self.buf[index].take()
        } else {
            None
        };

        let index = self.pos.push_back();
        self.buf[index] = Some(item);
        self.mutated();
        evicted
    }

    /// Adds an item to the end of the queue, evicting the oldest item if the queue [is full](Self::is_full).
    ///
    /// # Examples
    /// ```
    /// # use bounded_queue::BoundedQueue;
    /// let mut queue = BoundedQueue::new(3).unwrap();
    /// for i in 1..=5 {
    ///     queue.push(i);
    /// }
    /// assert_eq!(queue.len(), 3);
    /// assert_eq!(queue, [3, 4, 5]);
    /// ```
    #[inline]
    pub fn push(&mut self, item: T) {
        self.pop_push(item);
    }

    /// Removes all items from the queue, dropping them.
    pub fn clear(&mut self) {
        for i in 0..self.len() {
            self.buf[self.pos.logical_index(i)] = None;
        }
        self.pos.reset();
        self.mutated();
    }

    /// Removes all items from the queue, yielding them oldest first.
    pub fn drain(&mut self) -> Drain<'_, T> {
        Drain::new(self)
    }

    /// Returns an iterator over the items in the queue, oldest first.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(&self.buf, self.pos)
    }

    /// Drops the cached snapshot, if any. Mutations already do this; it is only useful to
    /// release the memory held by a snapshot early.
    pub fn invalidate_snapshot(&mut self) {
        self.snapshots.invalidate();
    }

    fn mutated(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.snapshots.invalidate();
    }

    fn snapshot_key(&self) -> SnapshotKey {
        SnapshotKey {
            generation: self.generation,
            head: self.pos.head(),
            len: self.len(),
        }
    }
}

impl<T: Clone> BoundedQueue<T> {
    /// Copies the items of the queue into a `Vec`, oldest first.
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }

    /// Returns the items of the queue, oldest first, as a shared slice.
    ///
    /// Repeated calls without an intervening mutation reuse the same allocation for as long as
    /// the [`SnapshotPolicy`] allows.
    ///
    /// # Examples
    /// ```
    /// # use bounded_queue::BoundedQueue;
    /// let mut queue = BoundedQueue::new(4).unwrap();
    /// queue.extend([10, 20, 30, 40, 50]);
    /// let first = queue.snapshot();
    /// assert_eq!(&*first, &[20, 30, 40, 50]);
    ///
    /// queue.push(60);
    /// assert_eq!(&*queue.snapshot(), &[30, 40, 50, 60]);
    /// assert_eq!(&*first, &[20, 30, 40, 50]);
    /// ```
    pub fn snapshot(&self) -> Arc<[T]> {
        self.snapshots
            .get_or_insert_with(self.snapshot_key(), || self.iter().cloned().collect())
    }
}

impl<T: PartialEq> BoundedQueue<T> {
    /// Returns `true` if an item equal to `item` is currently held.
    ///
    /// Items that were evicted or popped are never found, even if their storage was not reused yet.
    ///
    /// # Examples
    /// ```
    /// # use bounded_queue::BoundedQueue;
    /// let mut queue = BoundedQueue::new(2).unwrap();
    /// queue.extend([None, Some(1), Some(2)]);
    /// assert!(!queue.contains(&None));
    /// queue.push(None);
    /// assert!(queue.contains(&None));
    /// ```
    pub fn contains(&self, item: &T) -> bool {
        self.position(item).is_some()
    }

    /// Returns the index of the oldest held item equal to `item`, 0 being the oldest.
    pub fn position(&self, item: &T) -> Option<usize> {
        self.snapshots
            .with_valid(self.snapshot_key(), |items| {
                items.iter().position(|x| x == item)
            })
            .unwrap_or_else(|| self.iter().position(|x| x == item))
    }
}

impl<T: Clone> Clone for BoundedQueue<T> {
    fn clone(&self) -> Self {
        Self {
            buf: self.buf.clone(),
            pos: self.pos,
            cap: self.cap,
            generation: self.generation,
            snapshots: self.snapshots.clone(),
        }
    }
}

/// Pushes every item of the iterator, evicting the oldest items as needed.
///
/// # Examples
/// ```
/// # use bounded_queue::BoundedQueue;
/// let mut queue = BoundedQueue::new(3).unwrap();
/// queue.extend([0, 1]);
/// assert_eq!(queue, [0, 1]);
/// queue.extend([2, 3]);
/// assert_eq!(queue, [1, 2, 3]);
/// ```
impl<T> Extend<T> for BoundedQueue<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.push(item);
        }
    }
}

impl<T: PartialEq> PartialEq for BoundedQueue<T> {
    fn eq(&self, other: &Self) -> bool {
        self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for BoundedQueue<T> {}

impl<T: Hash> Hash for BoundedQueue<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.len());
        self.iter().for_each(|item| item.hash(state))
    }
}

impl<T: PartialEq, B: AsRef<[T]> + ?Sized> PartialEq<B> for BoundedQueue<T> {
    fn eq(&self, other: &B) -> bool {
        self.iter().eq(other.as_ref())
    }
}

impl<T: Debug> Debug for BoundedQueue<T> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'buf, T> IntoIterator for &'buf BoundedQueue<T> {
    type Item = &'buf T;
    type IntoIter = Iter<'buf, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T> IntoIterator for BoundedQueue<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self.buf, self.pos)
    }
}
