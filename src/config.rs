use std::time::Duration;

use crate::{BoundedQueue, InvalidCapacity, SnapshotPolicy};

/// Settings for building a [`BoundedQueue`], e.g. from a consumer's configuration file.
///
/// With the `serde` feature enabled this (de)serializes as
/// `{ "max_size": 128, "snapshot_ttl_ms": 100 }`. A `null` TTL disables the snapshot cache and a
/// missing one selects the default.
///
/// # Examples
/// ```
/// # use std::time::Duration;
/// # use bounded_queue::{QueueConfig, SnapshotPolicy};
/// let queue = QueueConfig::new(6)
///     .snapshot_ttl(Duration::from_millis(250))
///     .build::<u64>()
///     .unwrap();
/// assert_eq!(queue.max_size(), 6);
/// assert_eq!(queue.snapshot_policy(), SnapshotPolicy::Ttl(Duration::from_millis(250)));
///
/// assert!(QueueConfig::new(-1).build::<u64>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QueueConfig {
    pub max_size: i64,
    #[cfg_attr(
        feature = "serde",
        serde(rename = "snapshot_ttl_ms", with = "ttl_ms", default)
    )]
    pub snapshot: SnapshotPolicy,
}

impl QueueConfig {
    pub fn new(max_size: i64) -> Self {
        Self {
            max_size,
            snapshot: SnapshotPolicy::default(),
        }
    }

    pub fn snapshot_ttl(mut self, ttl: Duration) -> Self {
        self.snapshot = SnapshotPolicy::Ttl(ttl);
        self
    }

    pub fn without_snapshot_cache(mut self) -> Self {
        self.snapshot = SnapshotPolicy::Disabled;
        self
    }

    /// Validates the settings and creates an empty queue.
    pub fn build<T>(&self) -> Result<BoundedQueue<T>, InvalidCapacity> {
        BoundedQueue::with_policy(self.max_size, self.snapshot)
    }
}

#[cfg(feature = "serde")]
mod ttl_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use crate::SnapshotPolicy;

    pub fn serialize<S: Serializer>(policy: &SnapshotPolicy, serializer: S) -> Result<S::Ok, S::Error> {
        let millis = match policy {
            SnapshotPolicy::Disabled => None,
            SnapshotPolicy::Ttl(ttl) => Some(u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX)),
        };
        millis.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SnapshotPolicy, D::Error> {
        Ok(match Option::<u64>::deserialize(deserializer)? {
            None => SnapshotPolicy::Disabled,
            Some(millis) => SnapshotPolicy::Ttl(Duration::from_millis(millis)),
        })
    }
}
