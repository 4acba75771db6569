//! In-memory values handed to the encoder.
//!
//! An [`Item`] is either an owned scalar, a mutable container overlay, or a
//! [`Value`] handle borrowed from an existing document. Handles whose buffer
//! is the encoder's registered base serialize as back-pointers instead of
//! copies, which is what makes delta encoding reuse unchanged subtrees.

use crate::mutable::{MutableArray, MutableDict};
use crate::value::Value;

/// An in-memory value tree.
#[derive(Debug, Clone)]
pub enum Item<'a> {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    Array(MutableArray<'a>),
    Dict(MutableDict<'a>),
    /// A reader handle into an existing document.
    Source(Value<'a>),
}

impl Item<'_> {
    /// Wrap binary data (distinguishing it from text).
    #[must_use]
    pub fn bytes(data: impl Into<Vec<u8>>) -> Self {
        Item::Bytes(data.into())
    }
}

impl From<bool> for Item<'_> {
    fn from(v: bool) -> Self {
        Item::Bool(v)
    }
}

impl From<i64> for Item<'_> {
    fn from(v: i64) -> Self {
        Item::Int(v)
    }
}

impl From<i32> for Item<'_> {
    fn from(v: i32) -> Self {
        Item::Int(v.into())
    }
}

impl From<f64> for Item<'_> {
    fn from(v: f64) -> Self {
        Item::Float(v)
    }
}

impl From<&str> for Item<'_> {
    fn from(v: &str) -> Self {
        Item::Str(v.to_owned())
    }
}

impl From<String> for Item<'_> {
    fn from(v: String) -> Self {
        Item::Str(v)
    }
}

impl<'a> From<MutableArray<'a>> for Item<'a> {
    fn from(v: MutableArray<'a>) -> Self {
        Item::Array(v)
    }
}

impl<'a> From<MutableDict<'a>> for Item<'a> {
    fn from(v: MutableDict<'a>) -> Self {
        Item::Dict(v)
    }
}

impl<'a> From<Value<'a>> for Item<'a> {
    fn from(v: Value<'a>) -> Self {
        Item::Source(v)
    }
}
