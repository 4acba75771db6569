//! Shale: binary JSON-like documents read in place and updated by appending
//! layers.
//!
//! A shale document is laid out so that navigation never parses: array
//! indexing and dict key lookup dereference backward pointers directly in
//! the raw bytes, so a deep lookup touches a logarithmic slice of the
//! buffer instead of the whole document. Edits never rewrite the base
//! buffer either: a mutable overlay re-encodes as a short *delta* suffix
//! whose pointers reach back into the base for unchanged subtrees, and the
//! concatenation `base || delta` is itself a valid document.
//!
//! ```
//! use shale::{MutableDict, Value, encode, encode_delta};
//!
//! // Build and encode a document.
//! let mut dict = MutableDict::new();
//! dict.set("kept", "unchanged value");
//! dict.set("changed", "old");
//! let base = encode(&dict.into()).unwrap();
//!
//! // Random-access read without decoding.
//! let root = Value::from_doc(&base).unwrap().as_dict().unwrap();
//! assert_eq!(root.get("changed").unwrap().unwrap().as_str().unwrap(), "old");
//!
//! // Edit through an overlay and append only the difference.
//! let mut overlay = MutableDict::from_source(root);
//! overlay.set("changed", "new");
//! let delta = encode_delta(&base, &overlay.into()).unwrap();
//!
//! let mut doc = base.clone();
//! doc.extend_from_slice(&delta);
//! let root = Value::from_doc(&doc).unwrap().as_dict().unwrap();
//! assert_eq!(root.get("changed").unwrap().unwrap().as_str().unwrap(), "new");
//! assert_eq!(root.get("kept").unwrap().unwrap().as_str().unwrap(), "unchanged value");
//! ```

pub mod array;
pub mod dict;
pub mod document;
pub mod encode;
pub mod error;
pub mod item;
pub mod json;
pub mod mutable;
pub mod tag;
pub mod value;

pub use array::ArrayRef;
pub use dict::DictRef;
pub use document::Document;
pub use encode::{Encoder, encode, encode_delta};
pub use error::{Error, Result};
pub use item::Item;
pub use json::{from_json, to_json};
pub use mutable::{Entry, MutableArray, MutableDict};
pub use tag::ValueType;
pub use value::{TypedValue, Value};
