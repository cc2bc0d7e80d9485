//! Borrowed, index-addressable view over a table's entries

use core::fmt::{self, Write};
use core::iter::Map;

use super::scalar::write_quoted;
use super::{Iter, Scalar, Table};

/// A `(key, value)` pair yielded by [`Items`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Item<'a, T> {
    pub key: &'a str,
    pub value: &'a T,
}

impl<'a, T> From<(&'a str, &'a T)> for Item<'a, T> {
    fn from((key, value): (&'a str, &'a T)) -> Self {
        Self { key, value }
    }
}

/// Read-only projection of a [`Table`] addressed by position.
///
/// Positions follow the table's slot scan order. The view borrows the table,
/// so the table cannot be mutated (and positions cannot shift) while it is
/// alive.
#[derive(Debug)]
pub struct Items<'a, T> {
    table: &'a Table<T>,
}

impl<T> Clone for Items<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Items<'_, T> {}

impl<'a, T: Scalar> Items<'a, T> {
    pub(super) fn new(table: &'a Table<T>) -> Self {
        Self { table }
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn key_at(&self, index: usize) -> Option<&'a str> {
        self.table.key_at(index)
    }

    pub fn value_at(&self, index: usize) -> Option<&'a T> {
        self.get(index).map(|item| item.value)
    }

    /// Pair at positional `index`, or `None` past the end
    pub fn get(&self, index: usize) -> Option<Item<'a, T>> {
        self.table.iter().nth(index).map(Item::from)
    }

    pub fn iter(&self) -> ItemIter<'a, T> {
        self.table
            .iter()
            .map(Item::from as fn((&'a str, &'a T)) -> Item<'a, T>)
    }
}

/// Iterator over the pairs of an [`Items`] view
pub type ItemIter<'a, T> = Map<Iter<'a, T>, fn((&'a str, &'a T)) -> Item<'a, T>>;

impl<'a, T: Scalar> IntoIterator for Items<'a, T> {
    type Item = Item<'a, T>;
    type IntoIter = ItemIter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Renders `[("key", value), ...]` with Python literals
impl<T: Scalar> fmt::Display for Items<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char('[')?;
        for (position, item) in self.iter().enumerate() {
            if position > 0 {
                f.write_str(", ")?;
            }
            f.write_char('(')?;
            write_quoted(f, item.key)?;
            f.write_str(", ")?;
            item.value.write_literal(f)?;
            f.write_char(')')?;
        }
        f.write_char(']')
    }
}
