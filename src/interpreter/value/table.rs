use std::{cell::RefCell, rc::Rc};

use tracing::{trace, warn};

use crate::{
    error::AllocError,
    interpreter::{
        alloc::{AllocRef, Charge, Charged},
        value::core::{Object, Slot},
    },
};

/// One key/value binding.
///
/// Entries live in an arena and are threaded through two singly linked lists:
/// the chain of their bucket and the list of all live entries. The entry's
/// charge covers its value slot; the arena is charged as a whole.
struct Entry {
    key:         Object,
    slot:        Slot,
    bucket_next: Option<usize>,
    list_next:   Option<usize>,
    _charge:     Charge,
}

/// A fixed-capacity chained hash table.
///
/// The bucket array is allocated once and never grows; collisions chain. New
/// entries are linked at the head of their chain and at the head of the live
/// list, so iteration yields the most recent binding first. Values live in
/// shared [`Slot`]s so references can point at them.
///
/// ## Example
/// ```
/// use std::rc::Rc;
///
/// use winter::interpreter::{
///     alloc::{AllocRef, SystemAllocator},
///     value::{core::Object, table::Table},
/// };
///
/// let alloc: AllocRef = Rc::new(SystemAllocator);
/// let mut table = Table::new(&alloc, 3).unwrap();
///
/// let (_, previous) = table.insert(Object::Int(1), Object::Int(10)).unwrap();
/// assert!(previous.is_none());
///
/// let (_, previous) = table.insert(Object::Int(1), Object::Int(20)).unwrap();
/// assert_eq!(previous.and_then(|o| o.as_int()), Some(10));
/// assert_eq!(table.get(&Object::Int(1)).and_then(|o| o.as_int()), Some(20));
/// assert!(table.get(&Object::Int(2)).is_none());
/// ```
pub struct Table {
    alloc:   AllocRef,
    buckets: Charged<Box<[Option<usize>]>>,
    entries: Vec<Entry>,
    arena:   Charge,
    head:    Option<usize>,
}

/// Bytes held by one value slot: the `Rc` counts and the cell.
const SLOT_SIZE: usize = 2 * size_of::<usize>() + size_of::<RefCell<Object>>();

impl Table {
    /// Allocates a table with `capacity` bucket chains. A capacity of zero is
    /// raised to one.
    ///
    /// # Errors
    /// Returns [`AllocError`] if the bucket array cannot be allocated.
    pub fn new(alloc: &AllocRef, capacity: usize) -> Result<Self, AllocError> {
        let capacity = capacity.max(1);
        let buckets = vec![None; capacity].into_boxed_slice();
        let size = capacity * size_of::<Option<usize>>();

        trace!(capacity, "table created");
        Ok(Self { alloc:   Rc::clone(alloc),
                  buckets: Charged::new(alloc, buckets, size)?,
                  entries: Vec::new(),
                  arena:   Charge::new(alloc, 0)?,
                  head:    None, })
    }

    /// The number of bucket chains.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// The number of bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table holds no bindings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The chain `key` belongs to.
    fn bucket_of(&self, key: &Object) -> usize {
        let capacity = self.capacity() as u64;
        usize::try_from(key.hash_key() % capacity).unwrap_or_default()
    }

    /// Walks the chain for `key` and returns the index of its entry.
    ///
    /// Every entry on the chain must hash back to the chain. If one does not,
    /// the table is inconsistent and the probe gives up.
    fn find(&self, key: &Object) -> Option<usize> {
        let bucket = self.bucket_of(key);
        let mut cursor = self.buckets[bucket];

        while let Some(index) = cursor {
            let entry = &self.entries[index];
            if self.bucket_of(&entry.key) != bucket {
                warn!(bucket, index, "table entry found on the wrong chain; probe aborted");
                return None;
            }
            if entry.key.equals(key) {
                return Some(index);
            }
            cursor = entry.bucket_next;
        }

        None
    }

    /// Returns a new handle to the value bound to `key`.
    #[must_use]
    pub fn get(&self, key: &Object) -> Option<Object> {
        self.find(key).map(|i| self.entries[i].slot.borrow().clone())
    }

    /// Returns the slot holding the value bound to `key`.
    #[must_use]
    pub fn slot(&self, key: &Object) -> Option<Slot> {
        self.find(key).map(|i| Rc::clone(&self.entries[i].slot))
    }

    /// Whether `key` is bound.
    #[must_use]
    pub fn contains(&self, key: &Object) -> bool {
        self.find(key).is_some()
    }

    /// Binds `key` to `value`.
    ///
    /// Both are dereferenced before they are stored. A fresh key gets a new
    /// entry; an existing key has its slot overwritten and the value it held
    /// is handed back, so releasing it is up to the caller.
    ///
    /// # Returns
    /// The binding's slot and the previous value, if any.
    ///
    /// # Errors
    /// Returns [`AllocError`] if a new entry cannot be allocated. The table is
    /// unchanged in that case.
    pub fn insert(&mut self, key: Object, value: Object) -> Result<(Slot, Option<Object>), AllocError> {
        let key = key.dereferenced();
        let value = value.dereferenced();

        if let Some(index) = self.find(&key) {
            let slot = Rc::clone(&self.entries[index].slot);
            let previous = slot.replace(value);
            return Ok((slot, Some(previous)));
        }

        self.reserve_entry()?;
        let charge = Charge::new(&self.alloc, SLOT_SIZE)?;
        let bucket = self.bucket_of(&key);
        let index = self.entries.len();
        let slot = Rc::new(RefCell::new(value));

        trace!(bucket, index, key = %key, "table insert");
        self.entries.push(Entry { key,
                                  slot: Rc::clone(&slot),
                                  bucket_next: self.buckets[bucket],
                                  list_next: self.head,
                                  _charge: charge });
        self.buckets[bucket] = Some(index);
        self.head = Some(index);

        Ok((slot, None))
    }

    /// Makes room in the arena for one more entry, charging any growth.
    fn reserve_entry(&mut self) -> Result<(), AllocError> {
        let len = self.entries.len();
        if len < self.entries.capacity() {
            return Ok(());
        }

        let capacity = (len * 2).max(4);
        self.arena.resize(capacity * size_of::<Entry>())?;
        self.entries.reserve_exact(capacity - len);
        trace!(capacity, "table arena grown");
        Ok(())
    }

    /// Iterates over the bindings, most recent first.
    pub fn iter(&self) -> impl Iterator<Item = (&Object, Object)> {
        std::iter::successors(self.head, |&i| self.entries[i].list_next).map(|i| {
            let entry = &self.entries[i];
            (&entry.key, entry.slot.borrow().clone())
        })
    }
}

impl Drop for Table {
    fn drop(&mut self) {
        let mut cursor = self.head.take();
        while let Some(index) = cursor {
            let entry = &mut self.entries[index];
            cursor = entry.list_next;
            drop(entry.slot.replace(Object::Null));
            entry.key = Object::Null;
        }
        trace!(entries = self.entries.len(), "table released");
    }
}

impl std::fmt::Debug for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::interpreter::{
        alloc::CountingAllocator,
        value::{core::Reference, string::WString},
    };

    fn counting() -> (Rc<CountingAllocator>, AllocRef) {
        let counting = Rc::new(CountingAllocator::new());
        let alloc: AllocRef = counting.clone();
        (counting, alloc)
    }

    #[test]
    fn many_keys_on_a_small_table() {
        let (_, alloc) = counting();
        let mut table = Table::new(&alloc, 3).unwrap();

        for k in 0..50 {
            table.insert(Object::Int(k), Object::Int(k * 2)).unwrap();
        }
        for k in 0..50 {
            table.insert(Object::Int(k), Object::Int(k * 3)).unwrap();
        }

        assert_eq!(table.len(), 50);
        assert_eq!(table.capacity(), 3);
        for k in 0..50 {
            assert_eq!(table.get(&Object::Int(k)).and_then(|o| o.as_int()), Some(k * 3));
        }
        assert!(table.get(&Object::Int(50)).is_none());
    }

    #[test]
    fn zero_capacity_is_raised_to_one() {
        let (_, alloc) = counting();
        let mut table = Table::new(&alloc, 0).unwrap();
        table.insert(Object::Int(1), Object::Null).unwrap();
        table.insert(Object::Int(2), Object::Null).unwrap();
        assert_eq!(table.capacity(), 1);
        assert!(table.contains(&Object::Int(1)));
        assert!(table.contains(&Object::Int(2)));
    }

    #[test]
    fn string_keys_compare_by_content() {
        let (_, alloc) = counting();
        let mut table = Table::new(&alloc, 8).unwrap();
        let a = WString::allocate(&alloc, b"drift").unwrap();
        let b = WString::allocate(&alloc, b"drift").unwrap();

        table.insert(Object::String(a), Object::Int(1)).unwrap();
        assert_eq!(table.get(&Object::String(b)).and_then(|o| o.as_int()), Some(1));
    }

    #[test]
    fn stored_values_are_dereferenced() {
        let (_, alloc) = counting();
        let mut table = Table::new(&alloc, 4).unwrap();
        let (slot, _) = table.insert(Object::Int(0), Object::Int(9)).unwrap();

        let reference = Object::Reference(Reference::to(&slot));
        table.insert(Object::Int(1), reference).unwrap();
        assert_eq!(table.get(&Object::Int(1)).map(|o| o.type_of()),
                   Some(crate::interpreter::value::core::ObjectType::Int));
    }

    #[test]
    fn iteration_is_most_recent_first() {
        let (_, alloc) = counting();
        let mut table = Table::new(&alloc, 2).unwrap();
        for k in 1..=4 {
            table.insert(Object::Int(k), Object::Null).unwrap();
        }
        let keys: Vec<i64> = table.iter().filter_map(|(k, _)| k.as_int()).collect();
        assert_eq!(keys, vec![4, 3, 2, 1]);
    }

    #[test]
    fn teardown_releases_keys_and_values() {
        let (counting, alloc) = counting();
        let baseline = counting.stats().live_bytes;
        {
            let mut table = Table::new(&alloc, 3).unwrap();
            for word in [&b"rime"[..], b"sleet", b"hail"] {
                let key = WString::allocate(&alloc, word).unwrap();
                let value = WString::allocate(&alloc, word).unwrap();
                table.insert(Object::String(key), Object::String(value)).unwrap();
            }
        }
        assert_eq!(counting.stats().live_bytes, baseline);
    }

    #[test]
    fn entries_charge_their_slot_and_the_arena() {
        let (counting, alloc) = counting();
        let mut table = Table::new(&alloc, 3).unwrap();
        let empty = counting.stats().live_bytes;

        table.insert(Object::Int(1), Object::Int(1)).unwrap();
        let one = counting.stats().live_bytes;
        assert_eq!(one - empty, table.entries.capacity() * size_of::<Entry>() + SLOT_SIZE);

        table.insert(Object::Int(2), Object::Int(2)).unwrap();
        assert_eq!(counting.stats().live_bytes - one, SLOT_SIZE);

        drop(table);
        assert_eq!(counting.stats().live_bytes, 0);
    }

    #[test]
    fn entry_on_the_wrong_chain_aborts_the_probe() {
        let (_, alloc) = counting();
        let mut table = Table::new(&alloc, 4).unwrap();
        table.insert(Object::Int(1), Object::Int(10)).unwrap();

        let home = table.bucket_of(&Object::Int(1));
        let stray = (2..).map(Object::Int)
                         .find(|k| table.bucket_of(k) != home)
                         .unwrap();
        table.entries[0].key = stray.clone();

        assert!(table.get(&Object::Int(1)).is_none());
        assert!(!table.contains(&stray));
        assert!(table.slot(&Object::Int(1)).is_none());
    }

    #[test]
    fn refused_entry_leaves_the_table_unchanged() {
        let (counting, alloc) = counting();
        let mut table = Table::new(&alloc, 3).unwrap();
        counting.set_limit(Some(counting.stats().live_bytes));

        assert!(table.insert(Object::Int(1), Object::Int(1)).is_err());
        assert!(table.is_empty());
    }
}
