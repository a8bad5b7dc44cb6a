//! Fixed-capacity open-addressing table with linear probing.
//!
//! Every slot carries an explicit state: free, deleted (a tombstone) or used
//! with its key and value. Lookups walk the probe sequence from the
//! key's home bucket, skipping tombstones, until they hit the key or a free
//! slot.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::string::ToString;
use core::fmt::Debug;

use crate::error::Error;
use crate::key::Key;
use crate::stats::OpenAddressingStats;
use crate::storage::allocate_slots;

#[derive(Clone)]
enum Slot<K, V> {
    Free,
    Deleted,
    Used(K, V),
}

/// Outcome of a walk along a key's probe sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Probe {
    /// The key lives at this index.
    Found(usize),
    /// The key is absent; this is the slot an insertion should use.
    Vacant(usize),
    /// The key is absent and no slot is free or deleted.
    Full,
}

/// A fixed-capacity hash table using linear probing.
///
/// `OpenAddressingTable<K, V>` maps integer keys to values of type `V`. The
/// capacity is chosen at construction, must be a power of two, and never
/// changes: there is no resize path.
///
/// ## Sizing
///
/// The table must never become completely full. Size it generously above
/// the expected peak number of live keys; long probe chains and tombstones
/// both degrade lookups well before the hard limit. Inserting a new key
/// into a table with no free or deleted slot left panics.
///
/// ## Removal
///
/// Removing a key leaves a tombstone unless the next slot in probe order is
/// free, in which case the slot is freed outright. Only that single next
/// slot is inspected; longer runs of tombstones are not compacted.
///
/// ## Example
///
/// ```rust
/// use fixtab::OpenAddressingTable;
///
/// let mut table = OpenAddressingTable::new(8)?;
/// for key in [0u64, 8, 16] {
///     table.try_emplace(key, key * 10);
/// }
///
/// assert!(table.remove(8));
/// assert_eq!(table.get(0), Some(&0));
/// assert_eq!(table.get(16), Some(&160));
///
/// let stats = table.statistics();
/// assert_eq!(stats.used_buckets(), 2);
/// assert_eq!(stats.deleted_buckets, 1);
/// # Ok::<(), fixtab::Error>(())
/// ```
#[derive(Clone)]
pub struct OpenAddressingTable<K, V> {
    slots: Box<[Slot<K, V>]>,
    mask: usize,
    len: usize,
}

impl<K, V> Debug for OpenAddressingTable<K, V>
where
    K: Debug,
    V: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        struct SlotMap<'a, K, V>(&'a [Slot<K, V>]);

        impl<K: Debug, V: Debug> Debug for SlotMap<'_, K, V> {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                let mut map = f.debug_map();
                for (index, slot) in self.0.iter().enumerate() {
                    match slot {
                        Slot::Free => {}
                        Slot::Deleted => {
                            map.entry(&index, &"<deleted>");
                        }
                        Slot::Used(key, value) => {
                            map.entry(&index, &(key, value));
                        }
                    }
                }
                map.finish()
            }
        }

        f.debug_struct("OpenAddressingTable")
            .field("len", &self.len)
            .field("capacity", &self.slots.len())
            .field("slots", &SlotMap(&self.slots))
            .finish()
    }
}

impl<K: Key, V> OpenAddressingTable<K, V> {
    /// Creates an empty table with exactly `capacity` slots.
    ///
    /// # Errors
    ///
    /// - [`Error::ZeroCapacity`] or [`Error::NotPowerOfTwo`] if `capacity` is
    ///   not a non-zero power of two.
    /// - [`Error::Allocation`] if the slot array cannot be allocated.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use fixtab::Error;
    /// use fixtab::OpenAddressingTable;
    ///
    /// let table: OpenAddressingTable<u32, String> = OpenAddressingTable::new(1024)?;
    /// assert_eq!(table.capacity(), 1024);
    /// assert!(table.is_empty());
    ///
    /// let err = OpenAddressingTable::<u32, String>::new(1000).unwrap_err();
    /// assert_eq!(err, Error::NotPowerOfTwo(1000));
    /// # Ok::<(), Error>(())
    /// ```
    pub fn new(capacity: usize) -> Result<Self, Error> {
        if capacity == 0 {
            return Err(Error::ZeroCapacity);
        }
        if !capacity.is_power_of_two() {
            return Err(Error::NotPowerOfTwo(capacity));
        }

        Ok(Self {
            slots: allocate_slots(capacity, || Slot::Free)?,
            mask: capacity - 1,
            len: 0,
        })
    }

    /// Returns the fixed number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the number of stored entries.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the table holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline(always)]
    fn home(&self, key: K) -> usize {
        key.masked_bucket(self.mask)
    }

    #[inline(always)]
    fn next_index(&self, index: usize) -> usize {
        (index + 1) & self.mask
    }

    /// Walk the probe sequence of `key`.
    ///
    /// The walk visits at most `capacity` slots, so it terminates even when
    /// the table holds no free slot at all.
    fn probe(&self, key: K) -> Probe {
        let mut index = self.home(key);
        let mut reusable = None;

        for _ in 0..self.slots.len() {
            match &self.slots[index] {
                Slot::Free => return Probe::Vacant(reusable.unwrap_or(index)),
                Slot::Deleted => {
                    if reusable.is_none() {
                        reusable = Some(index);
                    }
                }
                Slot::Used(stored, _) if *stored == key => return Probe::Found(index),
                Slot::Used(..) => {}
            }
            index = self.next_index(index);
        }

        match reusable {
            Some(index) => Probe::Vacant(index),
            None => Probe::Full,
        }
    }

    #[inline(always)]
    fn value_mut(&mut self, index: usize) -> &mut V {
        match &mut self.slots[index] {
            Slot::Used(_, value) => value,
            _ => unreachable!("slot {index} is not in use"),
        }
    }

    /// Returns a reference to the value stored for `key`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use fixtab::OpenAddressingTable;
    ///
    /// let mut table = OpenAddressingTable::new(16)?;
    /// table.try_emplace(3i64, "three");
    ///
    /// assert_eq!(table.get(3), Some(&"three"));
    /// assert_eq!(table.get(19), None);
    /// # Ok::<(), fixtab::Error>(())
    /// ```
    pub fn get(&self, key: K) -> Option<&V> {
        match self.probe(key) {
            Probe::Found(index) => match &self.slots[index] {
                Slot::Used(_, value) => Some(value),
                _ => unreachable!("slot {index} is not in use"),
            },
            Probe::Vacant(_) | Probe::Full => None,
        }
    }

    /// Returns a mutable reference to the value stored for `key`.
    pub fn get_mut(&mut self, key: K) -> Option<&mut V> {
        match self.probe(key) {
            Probe::Found(index) => Some(self.value_mut(index)),
            Probe::Vacant(_) | Probe::Full => None,
        }
    }

    /// Returns `true` if `key` is stored in the table.
    pub fn contains_key(&self, key: K) -> bool {
        matches!(self.probe(key), Probe::Found(_))
    }

    /// Inserts `value` under `key` unless the key is already present.
    ///
    /// Returns `(true, new)` if the value was inserted, or `(false, existing)`
    /// leaving the existing value untouched; `value` is dropped in that case.
    ///
    /// # Panics
    ///
    /// Panics if `key` is absent and the table has no free or deleted slot
    /// left.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use fixtab::OpenAddressingTable;
    ///
    /// let mut table = OpenAddressingTable::new(8)?;
    /// assert_eq!(table.try_emplace(1u8, 10), (true, &mut 10));
    /// assert_eq!(table.try_emplace(1u8, 20), (false, &mut 10));
    /// # Ok::<(), fixtab::Error>(())
    /// ```
    pub fn try_emplace(&mut self, key: K, value: V) -> (bool, &mut V) {
        self.try_emplace_with(key, || value)
    }

    /// Inserts the value built by `make` under `key` unless the key is already
    /// present.
    ///
    /// `make` only runs when a new value is actually stored.
    ///
    /// # Panics
    ///
    /// Panics if `key` is absent and the table has no free or deleted slot
    /// left.
    pub fn try_emplace_with(&mut self, key: K, make: impl FnOnce() -> V) -> (bool, &mut V) {
        match self.probe(key) {
            Probe::Found(index) => (false, self.value_mut(index)),
            Probe::Vacant(index) => {
                self.slots[index] = Slot::Used(key, make());
                self.len += 1;
                (true, self.value_mut(index))
            }
            Probe::Full => full_table_violation(self.slots.len()),
        }
    }

    /// Stores `value` under `key`, replacing any existing value.
    ///
    /// An existing value is dropped and the new one takes its slot, so the
    /// entry does not move.
    ///
    /// # Panics
    ///
    /// Panics if `key` is absent and the table has no free or deleted slot
    /// left.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use fixtab::OpenAddressingTable;
    ///
    /// let mut table = OpenAddressingTable::new(8)?;
    /// table.emplace(5u32, String::from("first"));
    /// *table.emplace(5u32, String::from("second")) += "!";
    ///
    /// assert_eq!(table.get(5).map(String::as_str), Some("second!"));
    /// assert_eq!(table.len(), 1);
    /// # Ok::<(), fixtab::Error>(())
    /// ```
    pub fn emplace(&mut self, key: K, value: V) -> &mut V {
        self.emplace_with(key, || value)
    }

    /// Stores the value built by `make` under `key`, replacing any existing
    /// value.
    ///
    /// # Panics
    ///
    /// Panics if `key` is absent and the table has no free or deleted slot
    /// left.
    pub fn emplace_with(&mut self, key: K, make: impl FnOnce() -> V) -> &mut V {
        match self.probe(key) {
            Probe::Found(index) => {
                let value = self.value_mut(index);
                *value = make();
                value
            }
            Probe::Vacant(index) => {
                self.slots[index] = Slot::Used(key, make());
                self.len += 1;
                self.value_mut(index)
            }
            Probe::Full => full_table_violation(self.slots.len()),
        }
    }

    /// Removes `key` and returns its value.
    ///
    /// The slot becomes free if the next slot in probe order is free, and a
    /// tombstone otherwise.
    pub fn take(&mut self, key: K) -> Option<V> {
        let Probe::Found(index) = self.probe(key) else {
            return None;
        };

        let vacated = if matches!(self.slots[self.next_index(index)], Slot::Free) {
            Slot::Free
        } else {
            Slot::Deleted
        };

        self.len -= 1;
        match core::mem::replace(&mut self.slots[index], vacated) {
            Slot::Used(_, value) => Some(value),
            _ => unreachable!("slot {index} is not in use"),
        }
    }

    /// Removes `key`, dropping its value.
    ///
    /// Returns `false` and leaves the table untouched if `key` is absent.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use fixtab::OpenAddressingTable;
    ///
    /// let mut table = OpenAddressingTable::new(8)?;
    /// table.try_emplace(42u16, ());
    ///
    /// assert!(table.remove(42));
    /// assert!(!table.remove(42));
    /// # Ok::<(), fixtab::Error>(())
    /// ```
    pub fn remove(&mut self, key: K) -> bool {
        self.take(key).is_some()
    }

    /// Drops every value and marks all slots free, keeping the allocation.
    pub fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = Slot::Free;
        }
        self.len = 0;
    }

    /// Returns an iterator over `(key, &value)` pairs in slot order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            slots: self.slots.iter(),
            remaining: self.len,
        }
    }

    /// Scans the slots and reports their states.
    pub fn statistics(&self) -> OpenAddressingStats {
        let mut stats = OpenAddressingStats {
            total_buckets: self.slots.len(),
            ..OpenAddressingStats::default()
        };

        for (index, slot) in self.slots.iter().enumerate() {
            match slot {
                Slot::Free => stats.free_buckets += 1,
                Slot::Deleted => stats.deleted_buckets += 1,
                Slot::Used(key, _) if self.home(*key) == index => {
                    stats.correctly_placed_buckets += 1
                }
                Slot::Used(..) => stats.misplaced_buckets += 1,
            }
        }

        stats
    }

    /// Returns the human-readable form of [`statistics`](Self::statistics).
    pub fn get_statistics(&self) -> String {
        self.statistics().to_string()
    }

    /// Computes a histogram of probe distances.
    ///
    /// Entry `d` counts the used slots sitting `d` steps after their home
    /// bucket (wrapping around the end of the array). The vector is as long as
    /// the largest distance plus one, and empty for an empty table.
    #[cfg(any(test, feature = "stats"))]
    pub fn probe_histogram(&self) -> alloc::vec::Vec<usize> {
        let mut hist = alloc::vec::Vec::new();
        for (index, slot) in self.slots.iter().enumerate() {
            if let Slot::Used(key, _) = slot {
                let distance = index.wrapping_sub(self.home(*key)) & self.mask;
                if hist.len() <= distance {
                    hist.resize(distance + 1, 0);
                }
                hist[distance] += 1;
            }
        }
        hist
    }
}

#[cold]
#[track_caller]
fn full_table_violation(capacity: usize) -> ! {
    panic!(
        "open-addressing table is full ({capacity} slots, none free or deleted); \
         size the table above its peak load"
    )
}

impl<K: Key, V> crate::table::FixedTable<K, V> for OpenAddressingTable<K, V> {
    fn len(&self) -> usize {
        self.len
    }

    fn get(&self, key: K) -> Option<&V> {
        OpenAddressingTable::get(self, key)
    }

    fn get_mut(&mut self, key: K) -> Option<&mut V> {
        OpenAddressingTable::get_mut(self, key)
    }

    fn try_emplace_with(&mut self, key: K, make: impl FnOnce() -> V) -> (bool, &mut V) {
        OpenAddressingTable::try_emplace_with(self, key, make)
    }

    fn emplace_with(&mut self, key: K, make: impl FnOnce() -> V) -> &mut V {
        OpenAddressingTable::emplace_with(self, key, make)
    }

    fn take(&mut self, key: K) -> Option<V> {
        OpenAddressingTable::take(self, key)
    }

    fn get_statistics(&self) -> String {
        OpenAddressingTable::get_statistics(self)
    }
}

/// An iterator over the entries of an [`OpenAddressingTable`].
///
/// Created by [`OpenAddressingTable::iter`].
pub struct Iter<'a, K, V> {
    slots: core::slice::Iter<'a, Slot<K, V>>,
    remaining: usize,
}

impl<'a, K: Copy, V> Iterator for Iter<'a, K, V> {
    type Item = (K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        for slot in self.slots.by_ref() {
            if let Slot::Used(key, value) = slot {
                self.remaining -= 1;
                return Some((*key, value));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K: Copy, V> ExactSizeIterator for Iter<'_, K, V> {}
