#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Pos {
    // Invariant: `head` and `tail` are `<= mask`
    head: usize,
    tail: usize,
    // Invariant: `len <= mask + 1`, and `(tail - head) & mask == len & mask`
    len: usize,
    // Invariant: `mask + 1` is a power of two
    mask: usize,
}

impl Pos {
    pub const fn zero(mask: usize) -> Self {
        Self {
            head: 0,
            tail: 0,
            len: 0,
            mask,
        }
    }

    #[inline(always)]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[inline(always)]
    pub const fn head(&self) -> usize {
        self.head
    }

    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the slot index holding the item at the given logical index, 0 being the oldest.
    /// The returned index is always in bounds, but only holds a live item if `index < len`.
    #[inline(always)]
    pub const fn logical_index(&self, index: usize) -> usize {
        self.head.wrapping_add(index) & self.mask
    }

    /// Slot of the newest item. Only meaningful when `len > 0`.
    #[inline(always)]
    pub const fn last_index(&self) -> usize {
        self.tail.wrapping_sub(1) & self.mask
    }

    /// Claims the slot at `tail` for a new item and returns its index.
    ///
    /// The caller must ensure there is room in the window.
    #[inline]
    pub fn push_back(&mut self) -> usize {
        debug_assert!(self.len <= self.mask);
        let index = self.tail;
        self.tail = (self.tail + 1) & self.mask;
        self.len += 1;
        self.debug_check();
        index
    }

    /// Releases the slot at `head` and returns its index.
    ///
    /// The caller must ensure the window is non-empty.
    #[inline]
    pub fn pop_front(&mut self) -> usize {
        debug_assert!(self.len > 0);
        let index = self.head;
        self.head = (self.head + 1) & self.mask;
        self.len -= 1;
        self.debug_check();
        index
    }

    /// Releases the slot of the newest item and returns its index.
    ///
    /// The caller must ensure the window is non-empty.
    #[inline]
    pub fn pop_back(&mut self) -> usize {
        debug_assert!(self.len > 0);
        self.tail = self.last_index();
        self.len -= 1;
        self.debug_check();
        self.tail
    }

    /// Drops the `n` oldest items from the window.
    pub fn advance(&mut self, n: usize) {
        debug_assert!(n <= self.len);
        self.head = self.logical_index(n);
        self.len -= n;
        self.debug_check();
    }

    pub fn reset(&mut self) {
        *self = Self::zero(self.mask);
    }

    #[inline(always)]
    fn debug_check(&self) {
        debug_assert_eq!(
            self.tail.wrapping_sub(self.head) & self.mask,
            self.len & self.mask
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wraparound() {
        let mut pos = Pos::zero(3);
        for expected in [0, 1, 2, 3] {
            assert_eq!(pos.push_back(), expected);
        }
        assert_eq!(pos.len(), 4);
        assert_eq!(pos.last_index(), 3);

        assert_eq!(pos.pop_front(), 0);
        assert_eq!(pos.push_back(), 0);
        assert_eq!(pos.head(), 1);
        assert_eq!(pos.last_index(), 0);
        assert_eq!(pos.logical_index(0), 1);
        assert_eq!(pos.logical_index(3), 0);
    }

    #[test]
    fn test_reset_keeps_mask() {
        let mut pos = Pos::zero(7);
        pos.push_back();
        pos.push_back();
        pos.pop_front();
        pos.reset();
        assert!(pos.is_empty());
        assert_eq!(pos, Pos::zero(7));
    }
}
