use crate::InvalidCapacity;

/// Largest internal allocation a queue may use. Rounding a larger size up to a power of two
/// could overflow on targets with a 32-bit `usize`.
pub const MAX_CAPACITY: usize = 1 << 30;

/// A validated queue size: the requested bound plus the power-of-two allocation backing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Capacity {
    // Invariant: `0 < max_size <= capacity <= MAX_CAPACITY`
    max_size: usize,
    // Invariant: power of two
    capacity: usize,
    mask: usize,
}

impl Capacity {
    /// Validates `max_size` and rounds it up to the smallest power of two that can hold it.
    ///
    /// # Examples
    /// ```
    /// # use bounded_queue::{Capacity, InvalidCapacity};
    /// let cap = Capacity::normalize(5).unwrap();
    /// assert_eq!(cap.max_size(), 5);
    /// assert_eq!(cap.capacity(), 8);
    /// assert_eq!(cap.mask(), 0b111);
    ///
    /// assert_eq!(
    ///     Capacity::normalize(0),
    ///     Err(InvalidCapacity::NotPositive { requested: 0 })
    /// );
    /// assert!(Capacity::normalize((1 << 30) + 1).is_err());
    /// ```
    pub fn normalize<N: TryInto<i64>>(max_size: N) -> Result<Self, InvalidCapacity> {
        let requested: i64 = max_size
            .try_into()
            .map_err(|_| InvalidCapacity::Unrepresentable)?;
        if requested <= 0 {
            return Err(InvalidCapacity::NotPositive { requested });
        }

        let max_size =
            usize::try_from(requested).map_err(|_| InvalidCapacity::exceeds_limit(requested))?;
        // checked before rounding, so `next_power_of_two` cannot overflow
        if max_size > MAX_CAPACITY {
            return Err(InvalidCapacity::exceeds_limit(requested));
        }

        let capacity = max_size.next_power_of_two();
        debug_assert!(capacity.is_power_of_two() && capacity <= MAX_CAPACITY);
        Ok(Self {
            max_size,
            capacity,
            mask: capacity - 1,
        })
    }

    /// The requested bound on live items. Eviction is gated on this value.
    #[inline(always)]
    pub const fn max_size(&self) -> usize {
        self.max_size
    }

    /// The internal allocation size. Always a power of two, and at least [`max_size`](Self::max_size).
    #[inline(always)]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline(always)]
    pub const fn mask(&self) -> usize {
        self.mask
    }
}
