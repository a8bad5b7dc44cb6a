use alloc::string::String;

use crate::key::Key;

/// The key/value contract shared by both table engines.
///
/// [`OpenAddressingTable`](crate::OpenAddressingTable) and
/// [`ChainingTable`](crate::ChainingTable) are interchangeable behind this
/// trait; their inherent methods carry the same names and meaning. It exists
/// so that drivers and tests can run one workload against either engine.
///
/// # Examples
///
/// ```rust
/// use fixtab::ChainingTable;
/// use fixtab::FixedTable;
/// use fixtab::OpenAddressingTable;
///
/// fn count_words(table: &mut impl FixedTable<u32, usize>, words: &[u32]) {
///     for &word in words {
///         *table.try_emplace(word, 0).1 += 1;
///     }
/// }
///
/// let words = [7, 3, 7, 7, 11];
/// let mut open = OpenAddressingTable::<u32, usize>::new(16)?;
/// let mut chained = ChainingTable::<u32, usize>::new(5)?;
/// count_words(&mut open, &words);
/// count_words(&mut chained, &words);
///
/// assert_eq!(FixedTable::get(&open, 7), Some(&3));
/// assert_eq!(FixedTable::get(&chained, 7), Some(&3));
/// # Ok::<(), fixtab::Error>(())
/// ```
pub trait FixedTable<K: Key, V> {
    /// Returns the number of stored entries.
    fn len(&self) -> usize;

    /// Returns `true` if no entries are stored.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the value stored for `key`.
    fn get(&self, key: K) -> Option<&V>;

    /// Returns the value stored for `key`, mutably.
    fn get_mut(&mut self, key: K) -> Option<&mut V>;

    /// Returns `true` if `key` is stored.
    fn contains_key(&self, key: K) -> bool {
        self.get(key).is_some()
    }

    /// Stores the value built by `make` unless `key` is present.
    ///
    /// Returns whether a value was stored, and the value now held for `key`.
    fn try_emplace_with(&mut self, key: K, make: impl FnOnce() -> V) -> (bool, &mut V);

    /// Stores `value` unless `key` is present.
    fn try_emplace(&mut self, key: K, value: V) -> (bool, &mut V) {
        self.try_emplace_with(key, || value)
    }

    /// Stores the value built by `make`, replacing any existing value.
    fn emplace_with(&mut self, key: K, make: impl FnOnce() -> V) -> &mut V;

    /// Stores `value`, replacing any existing value.
    fn emplace(&mut self, key: K, value: V) -> &mut V {
        self.emplace_with(key, || value)
    }

    /// Removes `key` and returns its value.
    fn take(&mut self, key: K) -> Option<V>;

    /// Removes `key`, returning `true` if it was present.
    fn remove(&mut self, key: K) -> bool {
        self.take(key).is_some()
    }

    /// Returns a human-readable occupancy report.
    fn get_statistics(&self) -> String;
}
