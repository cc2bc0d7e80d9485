//! Scalar payload types a table can be instantiated with

use core::fmt::{self, Debug, Write};

extern crate alloc;
use alloc::string::String;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::FLOAT_DISPLAY_DECIMALS;

mod sealed {
    pub trait Sealed {}
}

/// Payload type stored in a [`Table`](super::Table).
///
/// JSON and snapshot decoding both go through serde, so a single generic
/// parse routine covers every scalar. The trait is sealed: tables only hold
/// integers, floats, booleans, or text.
pub trait Scalar:
    sealed::Sealed + Clone + Debug + Default + PartialEq + Serialize + DeserializeOwned
{
    /// Python type name, used in diagnostics
    const TYPE_NAME: &'static str;

    /// Write the Python literal for this value (`True`, `3.14`, `"text"`).
    fn write_literal<W: Write>(&self, out: &mut W) -> fmt::Result;
}

macro_rules! int_scalar {
    ($($ty:ty),*) => {
        $(
            impl sealed::Sealed for $ty {}

            impl Scalar for $ty {
                const TYPE_NAME: &'static str = "int";

                fn write_literal<W: Write>(&self, out: &mut W) -> fmt::Result {
                    write!(out, "{}", self)
                }
            }
        )*
    };
}

macro_rules! float_scalar {
    ($($ty:ty),*) => {
        $(
            impl sealed::Sealed for $ty {}

            impl Scalar for $ty {
                const TYPE_NAME: &'static str = "float";

                fn write_literal<W: Write>(&self, out: &mut W) -> fmt::Result {
                    write!(out, "{:.*}", FLOAT_DISPLAY_DECIMALS, self)
                }
            }
        )*
    };
}

int_scalar!(i32, i64);
float_scalar!(f32, f64);

impl sealed::Sealed for bool {}

impl Scalar for bool {
    const TYPE_NAME: &'static str = "bool";

    fn write_literal<W: Write>(&self, out: &mut W) -> fmt::Result {
        out.write_str(if *self { "True" } else { "False" })
    }
}

impl sealed::Sealed for String {}

impl Scalar for String {
    const TYPE_NAME: &'static str = "str";

    fn write_literal<W: Write>(&self, out: &mut W) -> fmt::Result {
        write_quoted(out, self)
    }
}

/// Keys and text values render the same way: wrapped in double quotes.
pub(super) fn write_quoted<W: Write>(out: &mut W, text: &str) -> fmt::Result {
    out.write_char('"')?;
    out.write_str(text)?;
    out.write_char('"')
}
