//! Capacity schedule and the growth threshold.

/// Slot counts the table grows through, smallest first.
///
/// Each entry is a prime roughly halfway between consecutive powers of two,
/// which keeps `hash % capacity` from clustering on the low bits of the
/// rolling string hash.
pub const PRIMES: [usize; 26] = [
    53, 97, 193, 389, 769, 1543, 3079, 6151, 12289, 24593, 49157, 98317, 196613, 393241, 786433,
    1572869, 3145739, 6291469, 12582917, 25165843, 50331653, 100663319, 201326611, 402653189,
    805306457, 1610612741,
];

cfg_if::cfg_if! {
    if #[cfg(feature = "load-factor-seventy")] {
        const MAX_LOAD: (u128, u128) = (7, 10);
    } else if #[cfg(feature = "load-factor-fifty")] {
        const MAX_LOAD: (u128, u128) = (1, 2);
    } else if #[cfg(feature = "load-factor-eighty-five")] {
        const MAX_LOAD: (u128, u128) = (17, 20);
    } else {
        const MAX_LOAD: (u128, u128) = (7, 10);
    }
}

/// The configured maximum load factor as a float, for reporting only.
#[inline(always)]
pub(crate) fn max_load_factor() -> f64 {
    MAX_LOAD.0 as f64 / MAX_LOAD.1 as f64
}

/// Returns `true` once `occupied` slots out of `capacity` reach the growth
/// threshold.
///
/// Compared as exact rationals so that `38 / 53` trips the 70% threshold and
/// `37 / 53` does not, with no float rounding in between.
#[inline(always)]
pub(crate) fn at_max_load(occupied: usize, capacity: usize) -> bool {
    occupied as u128 * MAX_LOAD.1 >= capacity as u128 * MAX_LOAD.0
}

/// An ascending sequence of slot counts the table is allowed to take.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Schedule {
    steps: &'static [usize],
}

impl Default for Schedule {
    fn default() -> Self {
        Schedule { steps: &PRIMES }
    }
}

impl Schedule {
    /// Accepts a non-empty, strictly ascending schedule with no zero step.
    pub(crate) fn new(steps: &'static [usize]) -> Option<Self> {
        let first = *steps.first()?;
        if first == 0 || steps.windows(2).any(|w| w[0] >= w[1]) {
            return None;
        }
        Some(Schedule { steps })
    }

    pub(crate) fn initial(self) -> usize {
        self.steps[0]
    }

    pub(crate) fn largest(self) -> usize {
        self.steps[self.steps.len() - 1]
    }

    /// The smallest step strictly greater than `capacity`, if any.
    pub(crate) fn next_after(self, capacity: usize) -> Option<usize> {
        self.steps.iter().copied().find(|&step| step > capacity)
    }

    /// The smallest step greater than or equal to `capacity`, if any.
    pub(crate) fn at_least(self, capacity: usize) -> Option<usize> {
        self.steps.iter().copied().find(|&step| step >= capacity)
    }
}
