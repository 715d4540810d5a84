use thiserror::Error;

/// Why a table operation did not take effect.
///
/// Every fallible operation on [`HashTable`](crate::HashTable) reports one of
/// these instead of silently doing nothing, and a returned error always means
/// the table was left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    /// A string key of zero length was supplied.
    #[error("key must not be empty")]
    EmptyKey,
    /// A zero-length value buffer was supplied.
    #[error("value buffer must not be empty")]
    EmptyValue,
    /// `insert` was called with a key that is already present.
    #[error("key is already present")]
    DuplicateKey,
    /// The key is not present in the table.
    #[error("key not found")]
    KeyNotFound,
    /// A full probe cycle found neither the key nor a free slot.
    #[error("no free slot found after probing all {capacity} slots")]
    ProbeExhausted {
        /// Capacity at the time of the probe.
        capacity: usize,
    },
    /// The table needed to grow but the capacity schedule has no larger step.
    #[error("capacity schedule exhausted at {capacity} slots")]
    GrowthCeiling {
        /// Capacity the table is stuck at.
        capacity: usize,
    },
    /// A custom capacity schedule was empty, not strictly ascending, or
    /// started at zero.
    #[error("capacity schedule must be non-empty, non-zero and strictly ascending")]
    InvalidSchedule,
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;

    #[test]
    fn messages_name_the_capacity() {
        assert_eq!(
            TableError::GrowthCeiling { capacity: 97 }.to_string(),
            "capacity schedule exhausted at 97 slots"
        );
        assert_eq!(
            TableError::ProbeExhausted { capacity: 53 }.to_string(),
            "no free slot found after probing all 53 slots"
        );
        assert_eq!(TableError::EmptyKey.to_string(), "key must not be empty");
    }
}
