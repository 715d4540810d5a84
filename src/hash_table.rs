//! The open-addressed hash table.
//!
//! Slots live in a single array whose length is always a step of the capacity
//! schedule (53, 97, 193, ... by default). Collisions are resolved by linear
//! probing that wraps around the end of the array. Erased slots become
//! tombstones so that entries further along a probe chain stay reachable.

use alloc::vec::Vec;
use core::fmt::Debug;

use crate::capacity;
use crate::capacity::Schedule;
use crate::error::TableError;
use crate::key::KeyRef;
use crate::slot;
use crate::slot::Entry;
use crate::slot::Slot;

/// Outcome of walking a key's probe sequence.
#[derive(Debug, Clone, Copy)]
enum Probe<'t, 'a> {
    /// The key is stored at this index.
    Found(usize, &'t Entry<'a>),
    /// The key is absent; this is where it would be placed. Prefers the first
    /// tombstone passed over the terminating empty slot.
    Vacant(usize),
    /// A full cycle saw neither the key nor a free slot.
    Exhausted,
}

/// What `make_room` did ahead of a placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Growth {
    NotNeeded,
    Rebuilt,
    /// Growth was due but the schedule has no larger step. Tombstones may
    /// still have been purged in place.
    Ceiling,
}

#[inline(always)]
fn wrap(index: usize, capacity: usize) -> usize {
    if index >= capacity {
        index - capacity
    } else {
        index
    }
}

/// Debug statistics for hash table analysis.
///
/// Available in tests and with the `stats` feature.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone)]
pub struct DebugStats {
    /// Number of live entries
    pub populated: usize,
    /// Total number of slots
    pub capacity: usize,
    /// Number of slots holding a tombstone
    pub tombstones: usize,
    /// Load factor (populated / capacity)
    pub load_factor: f64,
    /// Load factor at which the next insert grows the table
    pub max_load_factor: f64,
    /// Longest distance of any entry from its home slot
    pub max_probe_length: usize,
    /// Average distance of entries from their home slot
    pub mean_probe_length: f64,
    /// Bytes held by the slot array, the entry boxes and their string keys
    pub total_bytes: usize,
}

#[cfg(any(test, feature = "stats"))]
impl DebugStats {
    /// Pretty-print the debug statistics.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== Hash Table Debug Statistics ===");
        println!(
            "Population: {}/{} ({:.2}% load factor, grows at {:.2}%)",
            self.populated,
            self.capacity,
            self.load_factor * 100.0,
            self.max_load_factor * 100.0
        );
        println!("Tombstones: {}", self.tombstones);
        println!(
            "Probe length: max {}, mean {:.3}",
            self.max_probe_length, self.mean_probe_length
        );
        println!("Total Allocated: {} bytes", self.total_bytes);
    }
}

/// An open-addressed hash table mapping keys to borrowed byte buffers.
///
/// `HashTable<'a>` stores one heap-allocated entry per key. String keys are
/// copied into the entry; values are *not*: the table keeps a `&'a [u8]`
/// view of the caller's buffer, so every buffer must outlive the table. The
/// table never frees value bytes.
///
/// Every fallible operation returns a [`TableError`] instead of silently
/// doing nothing, and an error always leaves the table unchanged.
///
/// The table is single-threaded by construction: all mutation goes through
/// `&mut self`.
///
/// ## Example
///
/// ```rust
/// use prime_hash::HashTable;
/// use prime_hash::TableError;
///
/// let alice = b"alice".to_vec();
/// let bob = b"bob".to_vec();
///
/// let mut table = HashTable::new();
/// table.insert("user:1", &alice).unwrap();
/// assert_eq!(table.insert("user:1", &bob), Err(TableError::DuplicateKey));
///
/// assert_eq!(table.assign("user:1", &bob), Ok(&alice[..]));
/// assert_eq!(table.find("user:1"), Ok(&bob[..]));
///
/// assert_eq!(table.erase("user:1"), Ok(&bob[..]));
/// assert_eq!(table.contains("user:1"), Ok(false));
/// ```
pub struct HashTable<'a> {
    slots: Vec<Slot<'a>>,
    populated: usize,
    deleted: usize,
    schedule: Schedule,
}

impl Debug for HashTable<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        use alloc::format;
        use alloc::string::ToString;

        f.debug_struct("HashTable")
            .field("populated", &self.populated)
            .field("tombstones", &self.deleted)
            .field("capacity", &self.capacity())
            .field(
                "slots",
                &self
                    .slots
                    .chunks(16)
                    .map(|row| {
                        row.iter()
                            .map(|slot| match slot {
                                Slot::Empty => "..".to_string(),
                                Slot::Deleted => "xx".to_string(),
                                Slot::Occupied(entry) => format!("{}", entry.key()),
                            })
                            .collect::<Vec<_>>()
                            .join(", ")
                    })
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl Default for HashTable<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> HashTable<'a> {
    /// Creates an empty table with 53 slots, the first step of [`PRIMES`].
    ///
    /// [`PRIMES`]: crate::PRIMES
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use prime_hash::HashTable;
    /// #
    /// let table = HashTable::new();
    /// assert_eq!(table.capacity(), 53);
    /// assert!(table.is_empty());
    /// ```
    pub fn new() -> Self {
        Self::from_schedule(Schedule::default())
    }

    /// Creates an empty table that grows through a custom capacity schedule.
    ///
    /// The table starts at `steps[0]` slots. `steps` must be non-empty,
    /// strictly ascending, and must not start at zero.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use prime_hash::HashTable;
    /// # use prime_hash::TableError;
    /// #
    /// let table = HashTable::with_schedule(&[11, 23, 47]).unwrap();
    /// assert_eq!(table.capacity(), 11);
    ///
    /// assert_eq!(
    ///     HashTable::with_schedule(&[23, 11]).unwrap_err(),
    ///     TableError::InvalidSchedule
    /// );
    /// ```
    pub fn with_schedule(steps: &'static [usize]) -> Result<Self, TableError> {
        let schedule = Schedule::new(steps).ok_or(TableError::InvalidSchedule)?;
        Ok(Self::from_schedule(schedule))
    }

    fn from_schedule(schedule: Schedule) -> Self {
        Self {
            slots: slot::empty_slots(schedule.initial()),
            populated: 0,
            deleted: 0,
            schedule,
        }
    }

    /// Returns the number of entries in the table.
    pub fn len(&self) -> usize {
        self.populated
    }

    /// Returns `true` if the table contains no entries.
    pub fn is_empty(&self) -> bool {
        self.populated == 0
    }

    /// Returns the number of slots.
    ///
    /// This is always a step of the table's capacity schedule.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns `len() / capacity()`.
    pub fn load_factor(&self) -> f64 {
        self.populated as f64 / self.capacity() as f64
    }

    /// Walks the probe sequence for `key`, wrapping at the end of the array
    /// and giving up after one full cycle.
    fn probe(&self, key: KeyRef<'_>) -> Probe<'_, 'a> {
        let capacity = self.capacity();
        let home = key.home_slot(capacity);
        let mut first_deleted = None;

        for step in 0..capacity {
            let index = wrap(home + step, capacity);
            match &self.slots[index] {
                Slot::Empty => return Probe::Vacant(first_deleted.unwrap_or(index)),
                Slot::Deleted => {
                    if first_deleted.is_none() {
                        first_deleted = Some(index);
                    }
                }
                Slot::Occupied(entry) if entry.key() == key => {
                    return Probe::Found(index, &**entry);
                }
                Slot::Occupied(_) => {}
            }
        }

        match first_deleted {
            Some(index) => Probe::Vacant(index),
            None => Probe::Exhausted,
        }
    }

    /// Validates `key` and returns its entry along with the slot index.
    fn find_entry(&self, key: KeyRef<'_>) -> Result<(usize, &Entry<'a>), TableError> {
        if key.is_empty() {
            return Err(TableError::EmptyKey);
        }
        if self.populated == 0 {
            return Err(TableError::KeyNotFound);
        }

        match self.probe(key) {
            Probe::Found(index, entry) => Ok((index, entry)),
            Probe::Vacant(_) | Probe::Exhausted => Err(TableError::KeyNotFound),
        }
    }

    /// Where a new entry for `key` would go, or `None` if the probe found no
    /// free slot.
    fn vacancy(&self, key: KeyRef<'_>) -> Result<Option<usize>, TableError> {
        match self.probe(key) {
            Probe::Found(..) => Err(TableError::DuplicateKey),
            Probe::Vacant(index) => Ok(Some(index)),
            Probe::Exhausted => Ok(None),
        }
    }

    /// Inserts a new entry for `key`, borrowing `value`.
    ///
    /// Before placing the entry the table checks whether it would reach its
    /// maximum load factor (70% by default) with the new entry counted. If so
    /// it first grows to the next step of its capacity schedule.
    ///
    /// Tombstones count towards the load unless the new entry reclaims one.
    /// When they alone push the table over, it is rebuilt at the same capacity
    /// if live entries use at most half of the load budget, and grows to the
    /// next step otherwise.
    ///
    /// # Errors
    ///
    /// - [`TableError::EmptyKey`] / [`TableError::EmptyValue`] for a
    ///   zero-length string key or value buffer. The table does not grow.
    /// - [`TableError::DuplicateKey`] if `key` is already present. The
    ///   existing value is kept; use [`assign`](Self::assign) to replace it.
    /// - [`TableError::GrowthCeiling`] if every slot is taken and the
    ///   schedule has no larger step.
    /// - [`TableError::ProbeExhausted`] if a probe finds no free slot although
    ///   growth was not due.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use prime_hash::HashTable;
    /// # use prime_hash::TableError;
    /// #
    /// let bytes = [1u8, 2, 3];
    /// let mut table = HashTable::new();
    ///
    /// table.insert("k", &bytes).unwrap();
    /// table.insert(42u32, &bytes).unwrap();
    ///
    /// assert_eq!(table.insert("", &bytes), Err(TableError::EmptyKey));
    /// assert_eq!(table.insert("v", &[]), Err(TableError::EmptyValue));
    /// assert_eq!(table.len(), 2);
    /// ```
    pub fn insert<'k>(
        &mut self,
        key: impl Into<KeyRef<'k>>,
        value: &'a [u8],
    ) -> Result<(), TableError> {
        let key = key.into();
        if key.is_empty() {
            return Err(TableError::EmptyKey);
        }
        if value.is_empty() {
            return Err(TableError::EmptyValue);
        }

        let mut vacancy = self.vacancy(key)?;
        let reclaims = vacancy.is_some_and(|index| matches!(self.slots[index], Slot::Deleted));

        let growth = self.make_room(reclaims);
        if growth != Growth::NotNeeded {
            vacancy = self.vacancy(key)?;
        }

        let Some(index) = vacancy else {
            let capacity = self.capacity();
            return Err(match growth {
                Growth::Ceiling => TableError::GrowthCeiling { capacity },
                Growth::NotNeeded | Growth::Rebuilt => TableError::ProbeExhausted { capacity },
            });
        };

        if matches!(self.slots[index], Slot::Deleted) {
            self.deleted -= 1;
        }
        self.slots[index] = Slot::Occupied(Entry::boxed(key, value));
        self.populated += 1;
        Ok(())
    }

    /// Grows or purges tombstones so that one more entry fits under the load
    /// threshold. `reclaims` is set when the entry will take over a tombstone,
    /// which leaves the occupied slot count unchanged.
    fn make_room(&mut self, reclaims: bool) -> Growth {
        let capacity = self.capacity();

        if !capacity::at_max_load(self.populated + 1, capacity) {
            if reclaims || !capacity::at_max_load(self.populated + self.deleted + 1, capacity) {
                return Growth::NotNeeded;
            }
            // After an in-place purge at least half the load budget is free
            // again before the next one.
            if !capacity::at_max_load(2 * (self.populated + 1), capacity) {
                self.resize(capacity);
                return Growth::Rebuilt;
            }
        }

        match self.schedule.next_after(capacity) {
            Some(next) => {
                self.resize(next);
                Growth::Rebuilt
            }
            None => {
                if self.deleted > 0 && !reclaims {
                    self.resize(capacity);
                }
                Growth::Ceiling
            }
        }
    }

    /// Moves every live entry into a fresh array of `capacity` slots,
    /// recomputing each home slot. Tombstones are dropped.
    ///
    /// `capacity` must be at least the current capacity.
    fn resize(&mut self, capacity: usize) {
        debug_assert!(capacity >= self.capacity());

        let old = core::mem::replace(&mut self.slots, slot::empty_slots(capacity));
        for old_slot in old {
            if let Slot::Occupied(entry) = old_slot {
                let home = entry.key().home_slot(capacity);
                let index = (0..capacity)
                    .map(|step| wrap(home + step, capacity))
                    .find(|&index| matches!(self.slots[index], Slot::Empty))
                    .expect("a resized table has a free slot for every live entry");
                self.slots[index] = Slot::Occupied(entry);
            }
        }
        self.deleted = 0;
    }

    /// Returns the value stored for `key`.
    ///
    /// # Errors
    ///
    /// [`TableError::EmptyKey`] or [`TableError::KeyNotFound`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use prime_hash::HashTable;
    /// # use prime_hash::TableError;
    /// #
    /// let bytes = *b"payload";
    /// let mut table = HashTable::new();
    /// table.insert("k", &bytes).unwrap();
    ///
    /// assert_eq!(table.find("k"), Ok(&bytes[..]));
    /// assert_eq!(table.find("missing"), Err(TableError::KeyNotFound));
    /// ```
    pub fn find<'k>(&self, key: impl Into<KeyRef<'k>>) -> Result<&'a [u8], TableError> {
        self.find_entry(key.into()).map(|(_, entry)| entry.value())
    }

    /// Returns the value stored for `key`, or `None` for any error `find`
    /// would report.
    pub fn get<'k>(&self, key: impl Into<KeyRef<'k>>) -> Option<&'a [u8]> {
        self.find(key).ok()
    }

    /// Returns whether `key` is present.
    ///
    /// Follows the same probe sequence as `insert`, so entries displaced by
    /// collisions are found.
    ///
    /// # Errors
    ///
    /// [`TableError::EmptyKey`] for a zero-length string key.
    pub fn contains<'k>(&self, key: impl Into<KeyRef<'k>>) -> Result<bool, TableError> {
        match self.find_entry(key.into()) {
            Ok(_) => Ok(true),
            Err(TableError::KeyNotFound) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Replaces the value of an existing entry and returns the previous one.
    ///
    /// The key and the entry's allocation are left untouched.
    ///
    /// # Errors
    ///
    /// [`TableError::EmptyKey`], [`TableError::EmptyValue`] or
    /// [`TableError::KeyNotFound`]. `assign` never inserts.
    pub fn assign<'k>(
        &mut self,
        key: impl Into<KeyRef<'k>>,
        value: &'a [u8],
    ) -> Result<&'a [u8], TableError> {
        let key = key.into();
        if key.is_empty() {
            return Err(TableError::EmptyKey);
        }
        if value.is_empty() {
            return Err(TableError::EmptyValue);
        }

        let (index, _) = self.find_entry(key)?;
        let Slot::Occupied(entry) = &mut self.slots[index] else {
            unreachable!("find_entry only reports occupied slots");
        };
        Ok(entry.replace_value(value))
    }

    /// Removes the entry for `key` and returns the value it referenced.
    ///
    /// The entry and its key copy are freed; the value bytes belong to the
    /// caller and are not touched.
    ///
    /// # Errors
    ///
    /// [`TableError::EmptyKey`] or [`TableError::KeyNotFound`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use prime_hash::HashTable;
    /// # use prime_hash::TableError;
    /// #
    /// let bytes = [7u8];
    /// let mut table = HashTable::new();
    /// table.insert("k", &bytes).unwrap();
    ///
    /// assert_eq!(table.erase("k"), Ok(&bytes[..]));
    /// assert_eq!(table.erase("k"), Err(TableError::KeyNotFound));
    /// assert!(table.is_empty());
    /// ```
    pub fn erase<'k>(&mut self, key: impl Into<KeyRef<'k>>) -> Result<&'a [u8], TableError> {
        let (index, entry) = self.find_entry(key.into())?;
        let value = entry.value();

        self.slots[index] = Slot::Deleted;
        self.populated -= 1;
        self.deleted += 1;
        self.settle_tombstones(index);

        Ok(value)
    }

    /// Clears tombstones that no probe needs any more.
    ///
    /// A tombstone directly followed by an empty slot ends every probe that
    /// reaches it, so it can become empty itself. Repeats backwards from
    /// `index`.
    fn settle_tombstones(&mut self, mut index: usize) {
        let capacity = self.capacity();
        while matches!(self.slots[index], Slot::Deleted)
            && matches!(self.slots[wrap(index + 1, capacity)], Slot::Empty)
        {
            self.slots[index] = Slot::Empty;
            self.deleted -= 1;
            index = wrap(index + capacity - 1, capacity);
        }
    }

    /// Grows the table to hold at least `capacity` slots.
    ///
    /// The request is rounded up to the next step of the capacity schedule,
    /// and every entry is rehashed into the new array. Requests at or below
    /// the current capacity do nothing; the table never shrinks.
    ///
    /// # Errors
    ///
    /// [`TableError::GrowthCeiling`] if `capacity` exceeds the largest step
    /// of the schedule. The table is left as it was.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use prime_hash::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// table.reserve(100).unwrap();
    /// assert_eq!(table.capacity(), 193);
    ///
    /// table.reserve(60).unwrap();
    /// assert_eq!(table.capacity(), 193);
    /// ```
    pub fn reserve(&mut self, capacity: usize) -> Result<(), TableError> {
        if capacity <= self.capacity() {
            return Ok(());
        }

        let target = self
            .schedule
            .at_least(capacity)
            .ok_or(TableError::GrowthCeiling {
                capacity: self.capacity(),
            })?;
        self.resize(target);
        Ok(())
    }

    /// Same as [`reserve`](Self::reserve).
    pub fn rehash(&mut self, capacity: usize) -> Result<(), TableError> {
        self.reserve(capacity)
    }

    /// Returns the largest capacity this table can grow to.
    pub fn max_capacity(&self) -> usize {
        self.schedule.largest()
    }

    /// Distance of the entry at `index` from its home slot.
    #[cfg(any(test, feature = "stats"))]
    fn displacement(&self, index: usize, entry: &Entry<'_>) -> usize {
        let capacity = self.capacity();
        let home = entry.key().home_slot(capacity);
        wrap(index + capacity - home, capacity)
    }

    /// Computes a histogram of probe lengths for the current table state.
    ///
    /// Available in tests and with the `stats` feature.
    ///
    /// Bin `n` counts the entries stored `n` slots past their home slot,
    /// counting around the wrap. The vector is as long as the longest probe
    /// plus one, or empty for an empty table.
    #[cfg(any(test, feature = "stats"))]
    pub fn probe_histogram(&self) -> Vec<usize> {
        let mut hist = Vec::new();
        for (index, slot) in self.slots.iter().enumerate() {
            if let Some(entry) = slot.entry() {
                let distance = self.displacement(index, entry);
                if hist.len() <= distance {
                    hist.resize(distance + 1, 0);
                }
                hist[distance] += 1;
            }
        }
        hist
    }

    /// Returns detailed utilization statistics for debugging.
    ///
    /// Available in tests and with the `stats` feature.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> DebugStats {
        let hist = self.probe_histogram();
        let total_distance: usize = hist.iter().enumerate().map(|(d, &n)| d * n).sum();

        let key_bytes: usize = self
            .slots
            .iter()
            .filter_map(Slot::entry)
            .map(|entry| match entry.key() {
                KeyRef::Str(s) => s.len(),
                _ => 0,
            })
            .sum();

        DebugStats {
            populated: self.populated,
            capacity: self.capacity(),
            tombstones: self.deleted,
            load_factor: self.load_factor(),
            max_load_factor: capacity::max_load_factor(),
            max_probe_length: hist.len().saturating_sub(1),
            mean_probe_length: if self.populated == 0 {
                0.0
            } else {
                total_distance as f64 / self.populated as f64
            },
            total_bytes: self.capacity() * core::mem::size_of::<Slot<'_>>()
                + self.populated * core::mem::size_of::<Entry<'_>>()
                + key_bytes,
        }
    }

    /// Indices of entries with an empty slot somewhere between their home
    /// slot and their position. Such an entry is unreachable by probing.
    #[cfg(test)]
    pub(crate) fn broken_chains(&self) -> Vec<usize> {
        let capacity = self.capacity();
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.entry().map(|entry| (index, entry)))
            .filter(|&(index, entry)| {
                let home = entry.key().home_slot(capacity);
                (0..self.displacement(index, entry))
                    .any(|step| matches!(self.slots[wrap(home + step, capacity)], Slot::Empty))
            })
            .map(|(index, _)| index)
            .collect()
    }

    /// Pretty-prints the probe-length histogram horizontally using stdout.
    ///
    /// Requires the `std` feature, and either tests or the `stats` feature.
    #[cfg(all(any(test, feature = "stats"), feature = "std"))]
    pub fn print_probe_histogram(&self) {
        let hist = self.probe_histogram();
        let max = hist.iter().copied().max().unwrap_or(0);
        if max == 0 {
            println!("probe histogram: empty");
            return;
        }

        let max_bar = 60usize;
        let total_units = max_bar * 8;
        println!("probe histogram ({} entries):", self.populated);

        let make_bar = |count: usize| -> alloc::string::String {
            if count == 0 {
                return alloc::string::String::new();
            }
            let units = ((count as u128 * total_units as u128).div_ceil(max as u128)) as usize;
            let mut bar = "█".repeat(units / 8);
            let partial = ['▏', '▎', '▍', '▌', '▋', '▊', '▉'];
            if units % 8 > 0 {
                bar.push(partial[units % 8 - 1]);
            }
            bar
        };

        for (distance, &count) in hist.iter().enumerate() {
            println!("{:>3} | {} ({})", distance, make_bar(count), count);
        }
    }
}
