//! Interrupt-safe access to a table shared with event callbacks
//!
//! A [`Table`] is not synchronized. Sketches that write to a table from a BLE
//! write callback or a timer interrupt while the main loop reads it wrap the
//! table in a [`SharedTable`], which serializes access through a critical
//! section.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

use super::{Scalar, Table, TableError, TableResult};

/// A [`Table`] behind an embassy blocking mutex.
///
/// # Example
///
/// ```
/// use pyrt_core::{SharedTable, Table};
///
/// let readings: SharedTable<f32> = SharedTable::new(Table::new());
///
/// // From a callback:
/// readings.with(|table| table.set("temperature", 21.5)).unwrap();
///
/// // From the main loop:
/// let current = readings.with(|table| table.get_or("temperature", 0.0)).unwrap();
/// assert_eq!(current, 21.5);
/// ```
pub struct SharedTable<T> {
    inner: Mutex<CriticalSectionRawMutex, RefCell<Table<T>>>,
}

impl<T: Scalar> SharedTable<T> {
    pub const fn new(table: Table<T>) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(table)),
        }
    }

    /// Run `f` with exclusive access to the table.
    ///
    /// Interrupts are masked while `f` runs, so keep it short. Calling `with`
    /// again from inside `f` returns [`TableError::Busy`] instead of aliasing
    /// the table.
    pub fn with<R>(&self, f: impl FnOnce(&mut Table<T>) -> R) -> TableResult<R> {
        self.inner.lock(|cell| -> TableResult<R> {
            let mut table = cell.try_borrow_mut().map_err(|_| TableError::Busy)?;
            Ok(f(&mut *table))
        })
    }

    /// Deep copy of the current contents
    pub fn snapshot(&self) -> TableResult<Table<T>> {
        self.with(|table| table.copy())
    }

    pub fn into_inner(self) -> Table<T> {
        self.inner.into_inner().into_inner()
    }
}
