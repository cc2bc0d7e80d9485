//! Hardware-independent core library for pyrt
//!
//! This crate contains the value containers that transpiled sketches use to
//! get Python-like `dict` semantics on microcontrollers: a string-keyed
//! [`Table`] instantiated for one scalar payload type, its borrowed
//! [`Items`] view, JSON and binary snapshot codecs, and an interrupt-safe
//! [`SharedTable`] wrapper.
//!
//! It is `#![no_std]` with `extern crate alloc` so it compiles on both
//! embedded targets (ESP32-S3) and desktop hosts (for the runner and tests).

#![no_std]

extern crate alloc;

pub mod config;
pub mod table;

pub use table::{
    Item, ItemIter, Items, Iter, JsonErrorKind, Scalar, SharedTable, Table, TableError, TableResult,
};
