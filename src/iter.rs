use std::iter::FusedIterator;

use crate::{pos::Pos, BoundedQueue};

/// Returns the item in a slot that lies inside the live window.
#[inline(always)]
#[track_caller]
pub(crate) fn live<T>(buf: &[Option<T>], index: usize) -> &T {
    match &buf[index] {
        Some(item) => item,
        None => unreachable!("slot {index} is inside the live window but vacant"),
    }
}

/// Borrowing iterator over a [`BoundedQueue`], oldest item first.
///
/// Created by [`BoundedQueue::iter`]. The queue cannot be mutated while an `Iter` is alive.
pub struct Iter<'buf, T> {
    buf: &'buf [Option<T>],
    pos: Pos,
}

impl<'buf, T> Iter<'buf, T> {
    pub(crate) fn new(buf: &'buf [Option<T>], pos: Pos) -> Self {
        Self { buf, pos }
    }
}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            buf: self.buf,
            pos: self.pos,
        }
    }
}

impl<'buf, T> Iterator for Iter<'buf, T> {
    type Item = &'buf T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.pos.is_empty() {
            return None;
        }
        let index = self.pos.pop_front();
        Some(live(self.buf, index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.pos.len(), Some(self.pos.len()))
    }

    fn count(self) -> usize {
        self.pos.len()
    }

    fn nth(&mut self, n: usize) -> Option<Self::Item> {
        if n >= self.pos.len() {
            self.pos.advance(self.pos.len());
            return None;
        }
        self.pos.advance(n);
        self.next()
    }

    fn last(mut self) -> Option<Self::Item> {
        self.next_back()
    }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.pos.is_empty() {
            return None;
        }
        let index = self.pos.pop_back();
        Some(live(self.buf, index))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {
    fn len(&self) -> usize {
        self.pos.len()
    }
}

impl<T> FusedIterator for Iter<'_, T> {}

/// Owning iterator over a [`BoundedQueue`], oldest item first.
pub struct IntoIter<T> {
    buf: Box<[Option<T>]>,
    pos: Pos,
}

impl<T> IntoIter<T> {
    pub(crate) fn new(buf: Box<[Option<T>]>, pos: Pos) -> Self {
        Self { buf, pos }
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.pos.is_empty() {
            return None;
        }
        let index = self.pos.pop_front();
        self.buf[index].take()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.pos.len(), Some(self.pos.len()))
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        if self.pos.is_empty() {
            return None;
        }
        let index = self.pos.pop_back();
        self.buf[index].take()
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> FusedIterator for IntoIter<T> {}

/// Draining iterator created by [`BoundedQueue::drain`].
///
/// Items not consumed are dropped together with the iterator; the queue is empty afterwards either way.
pub struct Drain<'buf, T> {
    queue: &'buf mut BoundedQueue<T>,
}

impl<'buf, T> Drain<'buf, T> {
    pub(crate) fn new(queue: &'buf mut BoundedQueue<T>) -> Self {
        Self { queue }
    }
}

impl<T> Iterator for Drain<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.queue.pop()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.queue.len(), Some(self.queue.len()))
    }
}

impl<T> ExactSizeIterator for Drain<'_, T> {}

impl<T> FusedIterator for Drain<'_, T> {}

impl<T> Drop for Drain<'_, T> {
    fn drop(&mut self) {
        self.queue.clear();
    }
}

#[cfg(test)]
mod tests {
    use crate::BoundedQueue;

    /// Queue of max size 5 (capacity 8) whose window wraps past the end of storage.
    fn wrapped() -> BoundedQueue<i32> {
        let mut queue = BoundedQueue::new(5).unwrap();
        queue.extend(0..11);
        assert_eq!(queue.pos.head(), 6);
        queue
    }

    #[test]
    fn test_iter_wraps() {
        let queue = wrapped();
        let mut iter = queue.iter();
        assert_eq!(iter.len(), 5);
        assert!(iter.clone().eq(&[6, 7, 8, 9, 10]));

        assert_eq!(iter.next(), Some(&6));
        assert_eq!(iter.len(), 4);
        assert!(iter.eq(&[7, 8, 9, 10]));
    }

    #[test]
    fn test_iter_is_restartable() {
        let queue = wrapped();
        let first: Vec<_> = queue.iter().collect();
        let second: Vec<_> = queue.iter().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_iter_double_ended() {
        let queue = wrapped();
        assert!(queue.iter().rev().eq(&[10, 9, 8, 7, 6]));

        let mut iter = queue.iter();
        assert_eq!(iter.next_back(), Some(&10));
        assert_eq!(iter.next(), Some(&6));
        assert_eq!(iter.next_back(), Some(&9));
        assert_eq!(iter.len(), 2);
        assert!(iter.clone().eq(&[7, 8]));

        assert_eq!(iter.next(), Some(&7));
        assert_eq!(iter.next_back(), Some(&8));
        assert!(iter.next().is_none());
        assert!(iter.next_back().is_none());
    }

    #[test]
    fn test_iter_nth() {
        let queue = wrapped();
        let mut iter = queue.iter();
        assert_eq!(iter.nth(2), Some(&8));
        assert_eq!(iter.len(), 2);
        assert_eq!(iter.nth(1), Some(&10));
        assert_eq!(iter.nth(0), None);

        let mut iter = queue.iter();
        assert_eq!(iter.nth(5), None);
        assert_eq!(iter.len(), 0);
        assert_eq!(iter.next(), None);
        assert_eq!(queue.iter().last(), Some(&10));
    }

    #[test]
    fn test_into_iter() {
        let queue = wrapped();
        assert!(queue.clone().into_iter().eq([6, 7, 8, 9, 10]));

        let mut iter = queue.into_iter();
        assert_eq!(iter.next_back(), Some(10));
        assert_eq!(iter.len(), 4);
        assert_eq!(iter.next(), Some(6));
        assert_eq!(iter.collect::<Vec<_>>(), [7, 8, 9]);
    }

    #[test]
    fn test_drain() {
        let mut queue = wrapped();
        assert!(queue.drain().eq([6, 7, 8, 9, 10]));
        assert!(queue.is_empty());

        queue.extend([1, 2, 3]);
        let mut drain = queue.drain();
        assert_eq!(drain.len(), 3);
        assert_eq!(drain.next(), Some(1));
        drop(drain);
        assert!(queue.is_empty());
        assert_eq!(queue.peek(), None);
    }
}
