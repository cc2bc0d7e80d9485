//! JSON and binary snapshot codecs for tables
//!
//! Both formats share one serde implementation: a table serializes as a map
//! of its occupied slots in scan order, and deserializes by calling
//! [`Table::set`] for every entry. The value decoding is provided by the
//! [`Scalar`] bound, so there is a single parse routine for every payload
//! type.
//!
//! JSON uses `serde_json` (compact output, e.g. `{"b":2}`). Snapshots use
//! `postcard` so a table can be persisted next to the device's other binary
//! records.

use core::fmt;
use core::marker::PhantomData;

extern crate alloc;
use alloc::string::String;
use alloc::vec::Vec;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::error::Category;

use super::{JsonErrorKind, Scalar, Table, TableError, TableResult};

impl<T: Scalar> Serialize for Table<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self.iter() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de, T: Scalar> Deserialize<'de> for Table<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(TableVisitor(PhantomData))
    }
}

struct TableVisitor<T>(PhantomData<T>);

impl<'de, T: Scalar> Visitor<'de> for TableVisitor<T> {
    type Value = Table<T>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "an object of {} values", T::TYPE_NAME)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut table = Table::new();
        // Duplicate keys: the last occurrence wins
        while let Some((key, value)) = access.next_entry::<String, T>()? {
            table.set(key, value);
        }
        Ok(table)
    }
}

impl From<serde_json::Error> for TableError {
    fn from(err: serde_json::Error) -> Self {
        let kind = match err.classify() {
            Category::Syntax => JsonErrorKind::Syntax,
            Category::Data => JsonErrorKind::Data,
            Category::Eof => JsonErrorKind::Eof,
            Category::Io => JsonErrorKind::Io,
        };
        TableError::Json {
            kind,
            line: err.line(),
            column: err.column(),
        }
    }
}

impl From<postcard::Error> for TableError {
    fn from(err: postcard::Error) -> Self {
        TableError::Snapshot(err)
    }
}

impl<T: Scalar> Table<T> {
    /// Encode the occupied entries as a compact JSON object
    pub fn to_json(&self) -> TableResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode a JSON object into a new table
    pub fn parse_json(text: &str) -> TableResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Merge the entries of a JSON object into this table.
    ///
    /// The text is decoded completely before anything is merged, so on error
    /// the table is left exactly as it was.
    pub fn from_json(&mut self, text: &str) -> TableResult<()> {
        let parsed = Self::parse_json(text)?;
        self.update(&parsed);
        Ok(())
    }

    /// Encode the table as a postcard snapshot
    pub fn to_bytes(&self) -> TableResult<Vec<u8>> {
        Ok(postcard::to_allocvec(self)?)
    }

    /// Restore a table from a postcard snapshot
    pub fn from_bytes(bytes: &[u8]) -> TableResult<Self> {
        Ok(postcard::from_bytes(bytes)?)
    }
}
