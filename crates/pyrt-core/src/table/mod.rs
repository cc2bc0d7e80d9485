//! String-keyed associative container with Python `dict` semantics
//!
//! A [`Table`] maps short text keys to values of a single [`Scalar`] type.
//! Storage is a flat array of slots that is scanned linearly; there is no
//! hashing. Tables used by transpiled sketches stay small, and a linear scan
//! over a handful of slots is cheap on a microcontroller.
//!
//! # Growth
//!
//! A table starts with [`BASE_CAPACITY`] slots. Before a *new* key is
//! inserted, the table doubles its capacity once `count >= 0.7 * capacity`
//! and reinserts every occupied slot into the fresh array. Removing a key
//! only marks its slot as free; nothing is compacted until the next growth.
//!
//! # Missing keys
//!
//! Lookups never abort the program. Strict calls ([`Table::try_get`],
//! [`Table::remove`], [`Table::pop`]) return [`TableError::KeyNotFound`];
//! [`Table::get_or_default`] is the explicit opt-in for the soft-fail
//! behaviour sketches expect (a logged `KeyError` and a default value).
//!
//! # Examples
//!
//! ```
//! use pyrt_core::Table;
//!
//! let mut table: Table<i32> = Table::new();
//! table.set("a", 1);
//! table.set("b", 2);
//! assert_eq!(table.get("a"), Some(&1));
//!
//! table.remove("a").unwrap();
//! assert_eq!(table.get_or("a", -1), -1);
//! assert_eq!(table.to_json().unwrap(), r#"{"b":2}"#);
//! ```

use core::fmt::{self, Write};
use core::mem;

extern crate alloc;
use alloc::string::String;
use alloc::vec::Vec;

use log::{debug, warn};
use thiserror_no_std::Error;

use crate::config::{BASE_CAPACITY, LOAD_FACTOR_DEN, LOAD_FACTOR_NUM};

mod codec;
mod items;
mod scalar;
mod shared;

pub use items::{Item, ItemIter, Items};
pub use scalar::Scalar;
pub use shared::SharedTable;

use scalar::write_quoted;

/// Category of a JSON decoding failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonErrorKind {
    /// Input is not syntactically valid JSON
    Syntax,
    /// Valid JSON of the wrong shape (not an object, or a value of the wrong type)
    Data,
    /// Input ended in the middle of a value
    Eof,
    /// Failure reading the input
    Io,
}

/// Error types for table operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TableError {
    /// The key is not present in the table
    #[error("KeyError: {key:?} not found")]
    KeyNotFound {
        /// The missing key
        key: String,
    },

    /// JSON text could not be decoded into the table's value type
    #[error("JSON parse error ({kind:?}) at line {line}, column {column}")]
    Json {
        /// What went wrong
        kind: JsonErrorKind,
        /// One-based line of the failure (zero when unknown)
        line: usize,
        /// One-based column of the failure (zero when unknown)
        column: usize,
    },

    /// Binary snapshot could not be encoded or decoded
    #[error("Snapshot codec error: {0}")]
    Snapshot(postcard::Error),

    /// A shared table was accessed again from inside its own access closure
    #[error("Table is already borrowed")]
    Busy,
}

/// Result type for table operations
pub type TableResult<T> = Result<T, TableError>;

/// One storage slot. Free slots keep `occupied == false`.
#[derive(Debug, Clone, Default)]
struct Slot<T> {
    key: String,
    value: T,
    occupied: bool,
}

/// Python-style `dict[str, T]` for one scalar payload type
#[derive(Debug, Clone)]
pub struct Table<T> {
    /// Slot array; its length is the table capacity
    slots: Vec<Slot<T>>,
    /// Number of occupied slots
    count: usize,
}

impl<T: Scalar> Table<T> {
    /// Create an empty table with [`BASE_CAPACITY`] slots
    pub fn new() -> Self {
        Self::with_slots(BASE_CAPACITY)
    }

    fn with_slots(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, Slot::default);
        Self { slots, count: 0 }
    }

    /// Build a table mapping every key in `keys` to `value` (`dict.fromkeys`)
    pub fn from_keys<I, K>(keys: I, value: T) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        keys.into_iter().map(|key| (key, value.clone())).collect()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.count
    }

    /// Whether the table holds no entries
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Current slot count
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn find_index(&self, key: &str) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| slot.occupied && slot.key == key)
    }

    fn needs_growth(&self) -> bool {
        self.count * LOAD_FACTOR_DEN >= self.slots.len() * LOAD_FACTOR_NUM
    }

    /// Double the capacity and reinsert every occupied slot.
    fn grow(&mut self) {
        let capacity = self.slots.len() * 2;
        debug!(
            " Growing table from {} to {} slots ({} entries)",
            self.slots.len(),
            capacity,
            self.count
        );

        let old = mem::replace(self, Self::with_slots(capacity));

        // In a fresh array the first free slot is always the next index
        for (index, slot) in old.slots.into_iter().filter(|s| s.occupied).enumerate() {
            self.slots[index] = slot;
            self.count += 1;
        }
    }

    /// Insert a key known to be absent, growing first if needed.
    /// Returns the slot index that now holds it.
    fn insert_new(&mut self, key: String, value: T) -> usize {
        if self.needs_growth() {
            self.grow();
        }

        let index = match self.slots.iter().position(|slot| !slot.occupied) {
            Some(index) => index,
            // Unreachable while the load factor holds
            None => {
                self.slots.push(Slot::default());
                self.slots.len() - 1
            }
        };

        self.slots[index] = Slot {
            key,
            value,
            occupied: true,
        };
        self.count += 1;
        index
    }

    /// Empty the slot at `index` and hand back its value.
    fn vacate(&mut self, index: usize) -> T {
        let slot = mem::take(&mut self.slots[index]);
        self.count -= 1;
        slot.value
    }

    /// Insert or overwrite the value for `key`
    pub fn set(&mut self, key: impl Into<String>, value: T) {
        let key = key.into();
        match self.find_index(&key) {
            Some(index) => self.slots[index].value = value,
            None => {
                self.insert_new(key, value);
            }
        }
    }

    /// Value for `key`, or `None` when absent
    pub fn get(&self, key: &str) -> Option<&T> {
        self.find_index(key).map(|index| &self.slots[index].value)
    }

    /// Mutable value for `key`, or `None` when absent
    pub fn get_mut(&mut self, key: &str) -> Option<&mut T> {
        match self.find_index(key) {
            Some(index) => Some(&mut self.slots[index].value),
            None => None,
        }
    }

    /// Value for `key`, or [`TableError::KeyNotFound`]
    pub fn try_get(&self, key: &str) -> TableResult<&T> {
        self.get(key).ok_or_else(|| TableError::KeyNotFound { key: key.into() })
    }

    /// Value for `key`, or `default` when absent (`dict.get(key, default)`)
    pub fn get_or(&self, key: &str, default: T) -> T {
        self.get(key).cloned().unwrap_or(default)
    }

    /// Value for `key`, or `T::default()` after logging a `KeyError`.
    ///
    /// This is the soft-fail lookup transpiled `d[key]` reads rely on. Code
    /// that needs to tell "absent" from "present but default" should call
    /// [`Table::get`] or [`Table::get_or`] instead.
    pub fn get_or_default(&self, key: &str) -> T {
        match self.get(key) {
            Some(value) => value.clone(),
            None => {
                warn!("KeyError: {:?} not found, using default {}", key, T::TYPE_NAME);
                T::default()
            }
        }
    }

    /// Mutable value for `key`, inserting `T::default()` first when absent.
    ///
    /// Mirrors subscript assignment (`d[key] += 1`) in a sketch.
    pub fn get_or_insert_default(&mut self, key: &str) -> &mut T {
        let index = match self.find_index(key) {
            Some(index) => index,
            None => self.insert_new(key.into(), T::default()),
        };
        &mut self.slots[index].value
    }

    /// Existing value for `key`, or insert `default` and return it
    pub fn setdefault(&mut self, key: &str, default: T) -> &T {
        let index = match self.find_index(key) {
            Some(index) => index,
            None => self.insert_new(key.into(), default),
        };
        &self.slots[index].value
    }

    /// Whether `key` is present
    pub fn contains(&self, key: &str) -> bool {
        self.find_index(key).is_some()
    }

    /// Remove `key`, or report [`TableError::KeyNotFound`] leaving the table untouched
    pub fn remove(&mut self, key: &str) -> TableResult<()> {
        self.pop(key).map(|_| ())
    }

    /// Remove `key` and return its value
    pub fn pop(&mut self, key: &str) -> TableResult<T> {
        let index = self
            .find_index(key)
            .ok_or_else(|| TableError::KeyNotFound { key: key.into() })?;
        Ok(self.vacate(index))
    }

    /// Remove `key` and return its value, or `default` when absent
    pub fn pop_or(&mut self, key: &str, default: T) -> T {
        match self.find_index(key) {
            Some(index) => self.vacate(index),
            None => default,
        }
    }

    /// Drop every entry and shrink back to [`BASE_CAPACITY`] slots
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// Merge every entry of `other` into this table, `other` winning on collision
    pub fn update(&mut self, other: &Table<T>) {
        for (key, value) in other.iter() {
            self.set(key, value.clone());
        }
    }

    /// Independent deep copy
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// Snapshot of the keys in slot scan order
    pub fn keys(&self) -> Vec<String> {
        self.iter().map(|(key, _)| String::from(key)).collect()
    }

    /// Snapshot of the values in slot scan order
    pub fn values(&self) -> Vec<T> {
        self.iter().map(|(_, value)| value.clone()).collect()
    }

    /// Key at positional `index` in slot scan order
    pub fn key_at(&self, index: usize) -> Option<&str> {
        self.iter().nth(index).map(|(key, _)| key)
    }

    /// Iterate `(key, value)` pairs in slot scan order
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            slots: self.slots.iter(),
        }
    }

    /// Borrowed, index-addressable view of the entries
    pub fn items(&self) -> Items<'_, T> {
        Items::new(self)
    }
}

impl<T: Scalar> Default for Table<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Scalar> PartialEq for Table<T> {
    fn eq(&self, other: &Self) -> bool {
        self.count == other.count && self.iter().all(|(key, value)| other.get(key) == Some(value))
    }
}

impl<T: Scalar, K: Into<String>> FromIterator<(K, T)> for Table<T> {
    fn from_iter<I: IntoIterator<Item = (K, T)>>(iter: I) -> Self {
        let mut table = Self::new();
        table.extend(iter);
        table
    }
}

impl<T: Scalar, K: Into<String>> Extend<(K, T)> for Table<T> {
    fn extend<I: IntoIterator<Item = (K, T)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.set(key, value);
        }
    }
}

/// Renders `{"key": value, ...}` with Python literals
impl<T: Scalar> fmt::Display for Table<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char('{')?;
        for (position, (key, value)) in self.iter().enumerate() {
            if position > 0 {
                f.write_str(", ")?;
            }
            write_quoted(f, key)?;
            f.write_str(": ")?;
            value.write_literal(f)?;
        }
        f.write_char('}')
    }
}

/// Iterator over occupied slots of a [`Table`]
#[derive(Debug, Clone)]
pub struct Iter<'a, T> {
    slots: core::slice::Iter<'a, Slot<T>>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (&'a str, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        self.slots
            .by_ref()
            .find(|slot| slot.occupied)
            .map(|slot| (slot.key.as_str(), &slot.value))
    }
}

impl<'a, T: Scalar> IntoIterator for &'a Table<T> {
    type Item = (&'a str, &'a T);
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;
    use alloc::string::ToString;
    use alloc::vec;

    fn key(i: usize) -> String {
        format!("key{}", i)
    }

    #[test]
    fn test_new_table_is_empty() {
        let table: Table<i32> = Table::new();
        assert!(table.is_empty());
        assert_eq!(table.len(), 0);
        assert_eq!(table.capacity(), BASE_CAPACITY);
    }

    #[test]
    fn test_basic_scenario() {
        let mut table: Table<i32> = Table::new();
        table.set("a", 1);
        table.set("b", 2);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("a"), Some(&1));

        table.remove("a").unwrap();
        assert!(!table.contains("a"));
        assert_eq!(table.get_or("a", -1), -1);
        assert_eq!(table.to_json().unwrap(), r#"{"b":2}"#);
    }

    #[test]
    fn test_set_overwrites_existing_key() {
        let mut table: Table<i32> = Table::new();
        table.set("x", 1);
        table.set("x", 5);
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("x"), Some(&5));
    }

    #[test]
    fn test_size_counts_unique_keys() {
        let mut table: Table<i32> = Table::new();
        for i in 0..20 {
            table.set(key(i % 13), i as i32);
        }
        assert_eq!(table.len(), 13);
    }

    #[test]
    fn test_growth_triggers_on_seventh_insert() {
        let mut table: Table<i32> = Table::new();
        for i in 0..6 {
            table.set(key(i), i as i32);
        }
        assert_eq!(table.capacity(), 8);

        table.set(key(6), 6);
        assert_eq!(table.capacity(), 16);
        assert_eq!(table.len(), 7);
    }

    #[test]
    fn test_overwrite_never_grows() {
        let mut table: Table<i32> = Table::new();
        for i in 0..6 {
            table.set(key(i), i as i32);
        }
        table.set(key(0), 100);
        assert_eq!(table.capacity(), 8);
    }

    #[test]
    fn test_growth_preserves_entries() {
        let mut table: Table<i32> = Table::new();
        for i in 0..100 {
            table.set(key(i), (i * 3) as i32);
        }
        assert_eq!(table.len(), 100);
        assert!(table.capacity() >= 100);
        for i in 0..100 {
            assert_eq!(table.get(&key(i)), Some(&((i * 3) as i32)));
        }
    }

    #[test]
    fn test_growth_keeps_scan_order() {
        let mut table: Table<i32> = Table::new();
        for i in 0..6 {
            table.set(key(i), i as i32);
        }
        table.remove(&key(2)).unwrap();
        table.set("late", 99);
        let before = table.keys();

        table.set("trigger", 7);
        let mut expected = before.clone();
        expected.push("trigger".to_string());
        assert_eq!(table.capacity(), 16);
        assert_eq!(table.keys(), expected);
    }

    #[test]
    fn test_removed_slot_is_reused() {
        let mut table: Table<i32> = Table::new();
        table.set("a", 1);
        table.set("b", 2);
        table.set("c", 3);
        table.remove("a").unwrap();
        table.set("d", 4);
        assert_eq!(table.keys(), vec!["d", "b", "c"]);
    }

    #[test]
    fn test_remove_missing_key() {
        let mut table: Table<i32> = Table::new();
        table.set("a", 1);
        let err = table.remove("zzz").unwrap_err();
        assert_eq!(
            err,
            TableError::KeyNotFound {
                key: "zzz".to_string()
            }
        );
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_remove_decrements_once() {
        let mut table: Table<i32> = Table::new();
        table.set("a", 1);
        table.set("b", 2);
        table.remove("a").unwrap();
        assert_eq!(table.len(), 1);
        assert!(table.remove("a").is_err());
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_pop_returns_value() {
        let mut table: Table<i32> = Table::new();
        table.set("x", 100);
        assert_eq!(table.pop("x"), Ok(100));
        assert!(table.is_empty());
        assert!(matches!(
            table.pop("x"),
            Err(TableError::KeyNotFound { .. })
        ));
        assert_eq!(table.pop_or("x", 7), 7);
    }

    #[test]
    fn test_try_get_and_soft_default() {
        let mut table: Table<bool> = Table::new();
        table.set("flag", true);
        assert_eq!(table.try_get("flag"), Ok(&true));
        assert!(table.try_get("other").is_err());
        assert!(!table.get_or_default("other"));
        assert!(!table.contains("other"));
    }

    #[test]
    fn test_get_or_distinguishes_absent_from_default() {
        let mut table: Table<i32> = Table::new();
        table.set("zero", 0);
        assert_eq!(table.get_or("zero", -1), 0);
        assert_eq!(table.get_or("missing", -1), -1);
    }

    #[test]
    fn test_get_or_insert_default() {
        let mut table: Table<i32> = Table::new();
        *table.get_or_insert_default("hits") += 1;
        *table.get_or_insert_default("hits") += 1;
        assert_eq!(table.get("hits"), Some(&2));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_get_mut() {
        let mut table: Table<String> = Table::new();
        table.set("name", "Mojo".to_string());
        if let Some(name) = table.get_mut("name") {
            name.push_str("scale");
        }
        assert_eq!(table.get("name").map(String::as_str), Some("Mojoscale"));
        assert!(table.get_mut("lang").is_none());
    }

    #[test]
    fn test_setdefault() {
        let mut table: Table<i32> = Table::new();
        table.set("a", 1);
        assert_eq!(*table.setdefault("a", 9), 1);
        assert_eq!(*table.setdefault("b", 9), 9);
        assert_eq!(table.get("b"), Some(&9));
    }

    #[test]
    fn test_clear_resets_capacity() {
        let mut table: Table<i32> = Table::new();
        for i in 0..20 {
            table.set(key(i), 0);
        }
        table.clear();
        assert!(table.is_empty());
        assert_eq!(table.capacity(), BASE_CAPACITY);
        assert!(!table.contains(&key(0)));
    }

    #[test]
    fn test_update_merges_and_overwrites() {
        let mut a: Table<i32> = [("x", 1), ("y", 2)].into_iter().collect();
        let b: Table<i32> = [("y", 20), ("z", 30)].into_iter().collect();
        a.update(&b);

        assert_eq!(a.len(), 3);
        for (key, value) in b.iter() {
            assert_eq!(a.get(key), Some(value));
        }
        assert_eq!(a.get("x"), Some(&1));
    }

    #[test]
    fn test_copy_is_independent() {
        let mut source: Table<i32> = [("a", 1), ("b", 2)].into_iter().collect();
        let mut copy = source.copy();
        assert_eq!(copy, source);

        copy.set("c", 3);
        source.set("a", 10);
        assert!(!source.contains("c"));
        assert_eq!(copy.get("a"), Some(&1));
        assert_ne!(copy, source);
    }

    #[test]
    fn test_equality_ignores_order() {
        let a: Table<i32> = [("a", 1), ("b", 2)].into_iter().collect();
        let b: Table<i32> = [("b", 2), ("a", 1)].into_iter().collect();
        let c: Table<i32> = [("a", 1), ("b", 3)].into_iter().collect();
        let d: Table<i32> = [("a", 1)].into_iter().collect();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
    }

    #[test]
    fn test_from_keys() {
        let table = Table::from_keys(["a", "b", "c"], false);
        assert_eq!(table.len(), 3);
        assert_eq!(table.values(), vec![false, false, false]);
    }

    #[test]
    fn test_keys_values_and_key_at_agree() {
        let mut table: Table<i32> = Table::new();
        table.set("a", 1);
        table.set("b", 2);
        table.set("c", 3);
        table.remove("b").unwrap();

        let keys = table.keys();
        assert_eq!(keys, vec!["a", "c"]);
        assert_eq!(table.values(), vec![1, 3]);
        assert_eq!(table.key_at(1), Some("c"));
        assert_eq!(table.key_at(2), None);
    }

    #[test]
    fn test_display_python_style() {
        let mut ints: Table<i32> = Table::new();
        ints.set("a", 10);
        ints.set("b", -3);
        assert_eq!(ints.to_string(), r#"{"a": 10, "b": -3}"#);

        let mut flags: Table<bool> = Table::new();
        flags.set("flag1", true);
        flags.set("flag2", false);
        assert_eq!(flags.to_string(), r#"{"flag1": True, "flag2": False}"#);

        let mut floats: Table<f32> = Table::new();
        floats.set("pi", 3.14);
        assert_eq!(floats.to_string(), r#"{"pi": 3.14}"#);

        let mut names: Table<String> = Table::new();
        names.set("lang", "C++".to_string());
        assert_eq!(names.to_string(), r#"{"lang": "C++"}"#);

        assert_eq!(Table::<i32>::new().to_string(), "{}");
    }
}
