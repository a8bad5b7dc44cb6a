//! Fixed-bucket separate-chaining table with an overflow pool.
//!
//! Each primary bucket stores at most one entry inline. Colliding entries
//! live in an overflow pool, a `Vec` of nodes addressed by `u32` handles, and
//! are linked into their bucket's chain at the head. Nodes released by
//! removals are threaded onto a free list through their `next` link and
//! handed out again before the pool grows.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::string::ToString;
use alloc::vec::Vec;
use core::fmt::Debug;

use crate::error::Error;
use crate::key::Key;
use crate::stats::ChainingStats;
use crate::storage::allocate_slots;

/// Handle of a node in the overflow pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct NodeId(u32);

impl NodeId {
    #[inline(always)]
    fn new(index: usize) -> Self {
        Self(u32::try_from(index).expect("overflow pool exceeds u32 handle range"))
    }

    #[inline(always)]
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// A stored entry, inline in a bucket or linked in the pool. `next: None` is
/// the end of the chain.
#[derive(Clone)]
struct Entry<K, V> {
    key: K,
    value: V,
    next: Option<NodeId>,
}

#[derive(Clone)]
enum Bucket<K, V> {
    Empty,
    Occupied(Entry<K, V>),
}

#[derive(Clone)]
enum Node<K, V> {
    Free { next: Option<NodeId> },
    Linked(Entry<K, V>),
}

/// Where an entry was found.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Location {
    Bucket(usize),
    Node(NodeId),
}

/// A fixed-bucket hash table resolving collisions with overflow chains.
///
/// `ChainingTable<K, V>` has a fixed array of primary buckets, chosen at
/// construction, and any positive bucket count is accepted. Unlike
/// [`OpenAddressingTable`](crate::OpenAddressingTable) it never runs out of
/// room: collisions spill into an overflow pool that grows on demand, so the
/// bucket count does not need to exceed the expected number of keys.
///
/// ## Reference stability
///
/// Removing the key held inline in a bucket promotes the head of that
/// bucket's chain into the bucket, moving the promoted value. References
/// handed out earlier cannot observe this: every reference returned by the
/// table borrows it, and removal takes `&mut self`.
///
/// ## Example
///
/// ```rust
/// use fixtab::ChainingTable;
///
/// let mut table = ChainingTable::new(4)?;
/// table.try_emplace(0u32, "zero");
/// table.try_emplace(4u32, "four");
/// assert_eq!(table.statistics().collisions, 1);
///
/// // 4 is promoted from the overflow chain into bucket 0.
/// assert!(table.remove(0));
/// assert_eq!(table.get(0), None);
/// assert_eq!(table.get(4), Some(&"four"));
/// assert_eq!(table.statistics().collisions, 0);
/// # Ok::<(), fixtab::Error>(())
/// ```
#[derive(Clone)]
pub struct ChainingTable<K, V> {
    buckets: Box<[Bucket<K, V>]>,
    pool: Vec<Node<K, V>>,
    free_head: Option<NodeId>,
    len: usize,
}

impl<K, V> Debug for ChainingTable<K, V>
where
    K: Debug,
    V: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        struct Chains<'a, K, V>(&'a ChainingTable<K, V>);

        impl<K: Debug, V: Debug> Debug for Chains<'_, K, V> {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                let mut map = f.debug_map();
                for (index, bucket) in self.0.buckets.iter().enumerate() {
                    if let Bucket::Occupied(head) = bucket {
                        let mut chain = Vec::new();
                        chain.push((&head.key, &head.value));
                        let mut current = head.next;
                        while let Some(id) = current {
                            let node = self.0.linked(id);
                            chain.push((&node.key, &node.value));
                            current = node.next;
                        }
                        map.entry(&index, &chain);
                    }
                }
                map.finish()
            }
        }

        f.debug_struct("ChainingTable")
            .field("len", &self.len)
            .field("buckets", &self.buckets.len())
            .field("pool", &self.pool.len())
            .field("free_head", &self.free_head)
            .field("chains", &Chains(self))
            .finish()
    }
}

impl<K, V> ChainingTable<K, V> {
    #[inline(always)]
    fn linked(&self, id: NodeId) -> &Entry<K, V> {
        match &self.pool[id.index()] {
            Node::Linked(entry) => entry,
            Node::Free { .. } => unreachable!("free node {id:?} reached through a chain"),
        }
    }

    #[inline(always)]
    fn linked_mut(&mut self, id: NodeId) -> &mut Entry<K, V> {
        match &mut self.pool[id.index()] {
            Node::Linked(entry) => entry,
            Node::Free { .. } => unreachable!("free node {id:?} reached through a chain"),
        }
    }

    #[inline(always)]
    fn head_mut(&mut self, bucket: usize) -> &mut Entry<K, V> {
        match &mut self.buckets[bucket] {
            Bucket::Occupied(entry) => entry,
            Bucket::Empty => unreachable!("bucket {bucket} is empty"),
        }
    }

    fn entry(&self, location: Location) -> &Entry<K, V> {
        match location {
            Location::Bucket(bucket) => match &self.buckets[bucket] {
                Bucket::Occupied(entry) => entry,
                Bucket::Empty => unreachable!("bucket {bucket} is empty"),
            },
            Location::Node(id) => self.linked(id),
        }
    }

    fn entry_mut(&mut self, location: Location) -> &mut Entry<K, V> {
        match location {
            Location::Bucket(bucket) => self.head_mut(bucket),
            Location::Node(id) => self.linked_mut(id),
        }
    }

    /// Takes a node out of the free list, or grows the pool by one.
    ///
    /// The returned node is still marked free; the caller links it.
    fn allocate_node(&mut self) -> NodeId {
        match self.free_head {
            Some(id) => {
                self.free_head = match &self.pool[id.index()] {
                    Node::Free { next } => *next,
                    Node::Linked(_) => unreachable!("linked node {id:?} on the free list"),
                };
                id
            }
            None => {
                let id = NodeId::new(self.pool.len());
                self.pool.push(Node::Free { next: None });
                id
            }
        }
    }

    /// Unlinked node goes back on the free list; returns what it held.
    fn release_node(&mut self, id: NodeId) -> Entry<K, V> {
        let node = core::mem::replace(
            &mut self.pool[id.index()],
            Node::Free {
                next: self.free_head,
            },
        );
        self.free_head = Some(id);
        match node {
            Node::Linked(entry) => entry,
            Node::Free { .. } => unreachable!("released node {id:?} was already free"),
        }
    }
}

impl<K: Key, V> ChainingTable<K, V> {
    /// Creates an empty table with `capacity` primary buckets.
    ///
    /// The overflow pool starts empty and grows as collisions occur.
    ///
    /// # Errors
    ///
    /// - [`Error::ZeroCapacity`] if `capacity` is zero.
    /// - [`Error::Allocation`] if the bucket array cannot be allocated.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use fixtab::ChainingTable;
    ///
    /// let table: ChainingTable<i64, String> = ChainingTable::new(1000)?;
    /// assert_eq!(table.capacity(), 1000);
    /// # Ok::<(), fixtab::Error>(())
    /// ```
    pub fn new(capacity: usize) -> Result<Self, Error> {
        Ok(Self {
            buckets: allocate_slots(capacity, || Bucket::Empty)?,
            pool: Vec::new(),
            free_head: None,
            len: 0,
        })
    }

    /// Returns the number of primary buckets.
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// Returns the number of stored entries, primary and overflow.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the table holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline(always)]
    fn home(&self, key: K) -> usize {
        key.bucket(self.buckets.len())
    }

    fn locate(&self, key: K) -> Option<Location> {
        let bucket = self.home(key);
        let Bucket::Occupied(head) = &self.buckets[bucket] else {
            return None;
        };
        if head.key == key {
            return Some(Location::Bucket(bucket));
        }

        let mut current = head.next;
        while let Some(id) = current {
            let node = self.linked(id);
            if node.key == key {
                return Some(Location::Node(id));
            }
            current = node.next;
        }

        None
    }

    /// Returns a reference to the value stored for `key`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use fixtab::ChainingTable;
    ///
    /// let mut table = ChainingTable::new(3)?;
    /// table.try_emplace(1u8, 'a');
    /// table.try_emplace(4u8, 'b');
    ///
    /// assert_eq!(table.get(4), Some(&'b'));
    /// assert_eq!(table.get(7), None);
    /// # Ok::<(), fixtab::Error>(())
    /// ```
    pub fn get(&self, key: K) -> Option<&V> {
        self.locate(key)
            .map(|location| &self.entry(location).value)
    }

    /// Returns a mutable reference to the value stored for `key`.
    pub fn get_mut(&mut self, key: K) -> Option<&mut V> {
        let location = self.locate(key)?;
        Some(&mut self.entry_mut(location).value)
    }

    /// Returns `true` if `key` is stored in the table.
    pub fn contains_key(&self, key: K) -> bool {
        self.locate(key).is_some()
    }

    fn emplace_impl(&mut self, key: K, force: bool, make: impl FnOnce() -> V) -> (bool, &mut V) {
        let bucket = self.home(key);

        if let Bucket::Empty = self.buckets[bucket] {
            self.buckets[bucket] = Bucket::Occupied(Entry {
                key,
                value: make(),
                next: None,
            });
            self.len += 1;
            return (true, &mut self.head_mut(bucket).value);
        }

        if let Some(location) = self.locate(key) {
            let entry = self.entry_mut(location);
            if force {
                entry.value = make();
            }
            return (force, &mut entry.value);
        }

        let id = self.allocate_node();
        let next = self.head_mut(bucket).next.replace(id);
        self.pool[id.index()] = Node::Linked(Entry {
            key,
            value: make(),
            next,
        });
        self.len += 1;
        (true, &mut self.linked_mut(id).value)
    }

    /// Inserts `value` under `key` unless the key is already present.
    ///
    /// Returns `(true, new)` if the value was inserted, or `(false, existing)`
    /// leaving the existing value untouched; `value` is dropped in that case.
    /// A colliding key is linked at the head of its bucket's chain, reusing a
    /// released overflow node when one is available.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use fixtab::ChainingTable;
    ///
    /// let mut table = ChainingTable::new(2)?;
    /// assert_eq!(table.try_emplace(1u16, 10), (true, &mut 10));
    /// assert_eq!(table.try_emplace(3u16, 30), (true, &mut 30));
    /// assert_eq!(table.try_emplace(3u16, 99), (false, &mut 30));
    /// # Ok::<(), fixtab::Error>(())
    /// ```
    pub fn try_emplace(&mut self, key: K, value: V) -> (bool, &mut V) {
        self.emplace_impl(key, false, || value)
    }

    /// Inserts the value built by `make` under `key` unless the key is already
    /// present.
    ///
    /// `make` only runs when a new value is actually stored.
    pub fn try_emplace_with(&mut self, key: K, make: impl FnOnce() -> V) -> (bool, &mut V) {
        self.emplace_impl(key, false, make)
    }

    /// Stores `value` under `key`, replacing any existing value in place.
    pub fn emplace(&mut self, key: K, value: V) -> &mut V {
        self.emplace_impl(key, true, || value).1
    }

    /// Stores the value built by `make` under `key`, replacing any existing
    /// value in place.
    pub fn emplace_with(&mut self, key: K, make: impl FnOnce() -> V) -> &mut V {
        self.emplace_impl(key, true, make).1
    }

    /// Removes `key` and returns its value.
    ///
    /// If `key` sits inline in its bucket and the bucket has an overflow
    /// chain, the chain head is promoted into the bucket and its node
    /// released. A key found further down the chain is unlinked and its node
    /// released.
    pub fn take(&mut self, key: K) -> Option<V> {
        let bucket = self.home(key);
        let Bucket::Occupied(head) = &self.buckets[bucket] else {
            return None;
        };

        if head.key == key {
            let next = head.next;
            let vacated = match next {
                None => Bucket::Empty,
                Some(id) => Bucket::Occupied(self.release_node(id)),
            };
            self.len -= 1;
            return match core::mem::replace(&mut self.buckets[bucket], vacated) {
                Bucket::Occupied(entry) => Some(entry.value),
                Bucket::Empty => unreachable!("bucket {bucket} is empty"),
            };
        }

        let mut previous = None;
        let mut current = head.next;
        while let Some(id) = current {
            let node = self.linked(id);
            let next = node.next;
            if node.key == key {
                match previous {
                    None => self.head_mut(bucket).next = next,
                    Some(previous) => self.linked_mut(previous).next = next,
                }
                self.len -= 1;
                return Some(self.release_node(id).value);
            }
            previous = Some(id);
            current = next;
        }

        None
    }

    /// Removes `key`, dropping its value.
    ///
    /// Returns `false` and leaves the table untouched if `key` is absent.
    ///
    /// Removing a key stored inline in its bucket may move another entry of
    /// the same bucket (the chain head) into the bucket. References into the
    /// table obtained before the call do not survive it.
    pub fn remove(&mut self, key: K) -> bool {
        self.take(key).is_some()
    }

    /// Drops every value, empties all buckets and releases the overflow pool.
    pub fn clear(&mut self) {
        for bucket in self.buckets.iter_mut() {
            *bucket = Bucket::Empty;
        }
        self.pool.clear();
        self.free_head = None;
        self.len = 0;
    }

    /// Returns an iterator over `(key, &value)` pairs.
    ///
    /// Buckets are visited in order; within a bucket the inline entry comes
    /// first, followed by its chain from head to tail.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            table: self,
            bucket_index: 0,
            next_node: None,
            remaining: self.len,
        }
    }

    /// Walks every bucket and chain and reports their occupancy.
    pub fn statistics(&self) -> ChainingStats {
        let mut stats = ChainingStats {
            total_buckets: self.buckets.len(),
            pool_nodes: self.pool.len(),
            ..ChainingStats::default()
        };

        for bucket in self.buckets.iter() {
            match bucket {
                Bucket::Empty => stats.free_buckets += 1,
                Bucket::Occupied(head) => {
                    stats.used_buckets += 1;
                    let length = self.chain_length(head);
                    stats.collisions += length;
                    stats.longest_chain = stats.longest_chain.max(length);
                }
            }
        }

        let mut current = self.free_head;
        while let Some(id) = current {
            stats.free_nodes += 1;
            current = match &self.pool[id.index()] {
                Node::Free { next } => *next,
                Node::Linked(_) => unreachable!("linked node {id:?} on the free list"),
            };
        }

        stats
    }

    fn chain_length(&self, head: &Entry<K, V>) -> usize {
        let mut length = 0;
        let mut current = head.next;
        while let Some(id) = current {
            length += 1;
            current = self.linked(id).next;
        }
        length
    }

    /// Returns the human-readable form of [`statistics`](Self::statistics).
    pub fn get_statistics(&self) -> String {
        self.statistics().to_string()
    }

    /// Computes a histogram of overflow chain lengths over used buckets.
    ///
    /// Entry `n` counts the occupied buckets whose chain holds `n` overflow
    /// nodes. Empty for a table without entries.
    #[cfg(any(test, feature = "stats"))]
    pub fn chain_histogram(&self) -> Vec<usize> {
        let mut hist = Vec::new();
        for bucket in self.buckets.iter() {
            if let Bucket::Occupied(head) = bucket {
                let length = self.chain_length(head);
                if hist.len() <= length {
                    hist.resize(length + 1, 0);
                }
                hist[length] += 1;
            }
        }
        hist
    }
}

impl<K: Key, V> crate::table::FixedTable<K, V> for ChainingTable<K, V> {
    fn len(&self) -> usize {
        self.len
    }

    fn get(&self, key: K) -> Option<&V> {
        ChainingTable::get(self, key)
    }

    fn get_mut(&mut self, key: K) -> Option<&mut V> {
        ChainingTable::get_mut(self, key)
    }

    fn try_emplace_with(&mut self, key: K, make: impl FnOnce() -> V) -> (bool, &mut V) {
        self.emplace_impl(key, false, make)
    }

    fn emplace_with(&mut self, key: K, make: impl FnOnce() -> V) -> &mut V {
        self.emplace_impl(key, true, make).1
    }

    fn take(&mut self, key: K) -> Option<V> {
        ChainingTable::take(self, key)
    }

    fn get_statistics(&self) -> String {
        ChainingTable::get_statistics(self)
    }
}

/// An iterator over the entries of a [`ChainingTable`].
///
/// Created by [`ChainingTable::iter`].
pub struct Iter<'a, K, V> {
    table: &'a ChainingTable<K, V>,
    bucket_index: usize,
    next_node: Option<NodeId>,
    remaining: usize,
}

impl<'a, K: Copy, V> Iterator for Iter<'a, K, V> {
    type Item = (K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        if let Some(id) = self.next_node {
            let node = self.table.linked(id);
            self.next_node = node.next;
            self.remaining -= 1;
            return Some((node.key, &node.value));
        }

        while let Some(bucket) = self.table.buckets.get(self.bucket_index) {
            self.bucket_index += 1;
            if let Bucket::Occupied(head) = bucket {
                self.next_node = head.next;
                self.remaining -= 1;
                return Some((head.key, &head.value));
            }
        }

        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K: Copy, V> ExactSizeIterator for Iter<'_, K, V> {}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use alloc::vec;
    use core::cell::Cell;

    use hashbrown::HashMap;
    use rand::Rng;
    use rand::SeedableRng;
    use rand::TryRngCore;
    use rand::rngs::OsRng;
    use rand::rngs::SmallRng;

    use super::*;

    fn seeded_rng() -> SmallRng {
        let seed = OsRng.try_next_u64().unwrap_or(0);
        SmallRng::seed_from_u64(seed)
    }

    fn chain_of<K: Key, V>(table: &ChainingTable<K, V>, bucket: usize) -> Vec<K> {
        let mut keys = Vec::new();
        if let Bucket::Occupied(head) = &table.buckets[bucket] {
            keys.push(head.key);
            let mut current = head.next;
            while let Some(id) = current {
                let node = table.linked(id);
                keys.push(node.key);
                current = node.next;
            }
        }
        keys
    }

    #[test]
    fn rejects_zero_capacity() {
        assert_eq!(
            ChainingTable::<u64, ()>::new(0).unwrap_err(),
            Error::ZeroCapacity
        );
        assert_eq!(ChainingTable::<u64, ()>::new(7).unwrap().capacity(), 7);
    }

    #[test]
    fn insert_and_get() {
        let mut table = ChainingTable::new(10).unwrap();
        for k in 0..100u64 {
            assert_eq!(table.try_emplace(k, k * 3), (true, &mut (k * 3)));
        }
        assert_eq!(table.len(), 100);
        for k in 0..100u64 {
            assert_eq!(table.get(k), Some(&(k * 3)), "{:#?}", table);
        }
        assert_eq!(table.get(100), None);

        let stats = table.statistics();
        assert_eq!(stats.used_buckets, 10);
        assert_eq!(stats.collisions, 90);
        assert_eq!(stats.total_values(), 100);
        assert_eq!(stats.longest_chain, 9);
    }

    #[test]
    fn overflow_nodes_link_at_chain_head() {
        let mut table = ChainingTable::new(4).unwrap();
        for k in [1u32, 5, 9, 13] {
            table.try_emplace(k, ());
        }
        assert_eq!(chain_of(&table, 1), vec![1, 13, 9, 5]);
    }

    #[test]
    fn removing_inline_key_promotes_chain_head() {
        let mut table = ChainingTable::new(4).unwrap();
        table.try_emplace(0u64, "zero");
        table.try_emplace(4u64, "four");
        assert_eq!(chain_of(&table, 0), vec![0, 4]);

        assert!(table.remove(0));
        assert_eq!(table.get(0), None);
        assert_eq!(table.get(4), Some(&"four"));
        assert!(matches!(&table.buckets[0], Bucket::Occupied(head) if head.key == 4));

        let stats = table.statistics();
        assert_eq!(stats.total_values(), 1);
        assert_eq!(stats.collisions, 0);
        assert_eq!(stats.free_nodes, 1);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn promotion_keeps_rest_of_chain() {
        let mut table = ChainingTable::new(4).unwrap();
        for k in [2i32, 6, 10, 14] {
            table.try_emplace(k, k * 10);
        }
        // Chain order is 2, 14, 10, 6.
        assert!(table.remove(2));
        assert_eq!(chain_of(&table, 2), vec![14, 10, 6]);
        assert_eq!(table.statistics().total_values(), 3);
        for k in [6, 10, 14] {
            assert_eq!(table.get(k), Some(&(k * 10)));
        }
    }

    #[test]
    fn removing_chain_nodes_unlinks_them() {
        let mut table = ChainingTable::new(4).unwrap();
        for k in [3u64, 7, 11, 15] {
            table.try_emplace(k, k);
        }
        // Chain order is 3, 15, 11, 7: remove a middle node, then the tail,
        // then the node right after the bucket.
        assert!(table.remove(11));
        assert_eq!(chain_of(&table, 3), vec![3, 15, 7]);
        assert!(table.remove(7));
        assert_eq!(chain_of(&table, 3), vec![3, 15]);
        assert!(table.remove(15));
        assert_eq!(chain_of(&table, 3), vec![3]);

        let stats = table.statistics();
        assert_eq!(stats.pool_nodes, 3);
        assert_eq!(stats.free_nodes, 3);
        assert!(!table.remove(15));
    }

    #[test]
    fn free_list_is_reused_before_pool_grows() {
        let mut table = ChainingTable::new(2).unwrap();
        for k in 0..10u64 {
            table.try_emplace(k, k);
        }
        assert_eq!(table.statistics().pool_nodes, 8);

        for k in [2u64, 4, 5, 9] {
            assert!(table.remove(k));
        }
        assert_eq!(table.statistics().free_nodes, 4);

        for k in [20u64, 21, 22, 23] {
            table.try_emplace(k, k);
        }
        let stats = table.statistics();
        assert_eq!(stats.pool_nodes, 8);
        assert_eq!(stats.free_nodes, 0);

        table.try_emplace(24, 24);
        assert_eq!(table.statistics().pool_nodes, 9);
        for k in [0u64, 1, 3, 6, 7, 8, 20, 21, 22, 23, 24] {
            assert_eq!(table.get(k), Some(&k));
        }
    }

    #[test]
    fn try_emplace_keeps_existing_everywhere() {
        let mut table = ChainingTable::new(4).unwrap();
        table.try_emplace(1u8, 1);
        table.try_emplace(5u8, 5);

        let mut constructed = false;
        for key in [1u8, 5] {
            let (inserted, value) = table.try_emplace_with(key, || {
                constructed = true;
                0
            });
            assert!(!inserted);
            assert_eq!(*value, key as i32);
        }
        assert!(!constructed);
    }

    #[test]
    fn emplace_overwrites_everywhere() {
        let mut table = ChainingTable::new(4).unwrap();
        table.try_emplace(1u8, 1);
        table.try_emplace(5u8, 5);

        assert_eq!(*table.emplace(1, 10), 10);
        assert_eq!(*table.emplace(5, 50), 50);
        assert_eq!(table.len(), 2);
        assert_eq!(chain_of(&table, 1), vec![1, 5]);
        assert_eq!(table.get(5), Some(&50));
    }

    #[test]
    fn remove_missing_key_changes_nothing() {
        let mut table = ChainingTable::new(4).unwrap();
        for k in [0u64, 4, 8, 1] {
            table.try_emplace(k, k);
        }
        let before = table.statistics();
        assert!(!table.remove(12));
        assert!(!table.remove(2));
        assert_eq!(table.statistics(), before);
    }

    #[test]
    fn negative_keys_use_euclidean_buckets() {
        let mut table = ChainingTable::new(3).unwrap();
        table.try_emplace(-1i64, 'a');
        table.try_emplace(2i64, 'b');
        assert_eq!(chain_of(&table, 2), vec![-1, 2]);
        assert!(table.remove(-1));
        assert_eq!(table.get(2), Some(&'b'));
    }

    #[test]
    fn values_are_dropped() {
        let drops = Rc::new(Cell::new(0));

        struct Counted(Rc<Cell<usize>>);
        impl Drop for Counted {
            fn drop(&mut self) {
                self.0.set(self.0.get() + 1);
            }
        }

        {
            let mut table = ChainingTable::new(3).unwrap();
            for k in 0..9u32 {
                table.try_emplace(k, Counted(drops.clone()));
            }
            table.try_emplace(4, Counted(drops.clone()));
            assert_eq!(drops.get(), 1);

            // Promotion drops exactly the removed value.
            assert!(table.remove(0));
            assert_eq!(drops.get(), 2);
            assert!(table.remove(4));
            assert_eq!(drops.get(), 3);
        }
        assert_eq!(drops.get(), 10);
    }

    #[test]
    fn iter_visits_buckets_then_chains() {
        let mut table = ChainingTable::new(3).unwrap();
        for k in [0u32, 3, 1, 6, 2] {
            table.try_emplace(k, ());
        }
        let keys: Vec<u32> = table.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![0, 6, 3, 1, 2]);
        assert_eq!(table.iter().len(), 5);
    }

    #[test]
    fn clear_releases_pool() {
        let mut table = ChainingTable::new(2).unwrap();
        for k in 0..6u64 {
            table.try_emplace(k, k);
        }
        table.remove(2);
        table.clear();

        assert!(table.is_empty());
        let stats = table.statistics();
        assert_eq!(stats.free_buckets, 2);
        assert_eq!(stats.pool_nodes, 0);
        assert_eq!(stats.free_nodes, 0);

        table.try_emplace(3, 3);
        table.try_emplace(5, 5);
        assert_eq!(table.get(5), Some(&5));
    }

    #[test]
    fn chain_histogram_counts_used_buckets() {
        let mut table = ChainingTable::new(4).unwrap();
        for k in [0u64, 4, 8, 1, 5, 2] {
            table.try_emplace(k, ());
        }
        assert_eq!(table.chain_histogram(), vec![1, 1, 1]);
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn matches_reference_map() {
        let mut rng = seeded_rng();
        let mut table = ChainingTable::new(97).unwrap();
        let mut reference = HashMap::new();

        for i in 0..50_000u32 {
            let key = rng.random_range(0..1_000u64) * 16;
            match rng.random_range(0..4) {
                0 => assert_eq!(table.get(key), reference.get(&key)),
                1 => {
                    let expected = !reference.contains_key(&key);
                    let stored = reference.entry(key).or_insert(i);
                    assert_eq!(table.try_emplace(key, i), (expected, stored));
                }
                2 => {
                    reference.insert(key, i);
                    assert_eq!(*table.emplace(key, i), i);
                }
                _ => assert_eq!(table.remove(key), reference.remove(&key).is_some()),
            }
        }

        let stats = table.statistics();
        assert_eq!(stats.total_values(), reference.len());
        assert_eq!(stats.pool_nodes - stats.free_nodes, stats.collisions);
        for (key, value) in table.iter() {
            assert_eq!(reference.get(&key), Some(value));
        }
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    #[cfg(feature = "std")]
    fn histogram_output() {
        let mut rng = seeded_rng();
        let mut table = ChainingTable::new(500).unwrap();
        for _ in 0..1000 {
            let key: u32 = rng.random();
            table.try_emplace(key, ());
        }

        crate::stats::print_histogram("chain length", &table.chain_histogram());
        table.statistics().print();
    }
}
