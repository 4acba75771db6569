//! Copy-on-write overlays over reader handles.
//!
//! A [`MutableDict`] or [`MutableArray`] never touches the bytes of the
//! document it was opened from: edits accumulate in memory, and children
//! that were never touched stay [`Value`] handles into the source buffer.
//! When the overlay is re-encoded against that buffer as a base, untouched
//! children serialize as back-pointers, so only diverged subtrees are
//! emitted.
//!
//! ```
//! use shale::{Encoder, MutableDict};
//!
//! let mut dict = MutableDict::new();
//! dict.set("name", "alice");
//! dict.set("age", 30);
//! let doc = Encoder::new().encode(&dict.into()).unwrap();
//!
//! let root = shale::Value::from_doc(&doc).unwrap();
//! let age = root.as_dict().unwrap().get("age").unwrap().unwrap();
//! assert_eq!(age.as_int().unwrap(), 30);
//! ```

use std::collections::BTreeMap;

use crate::array::ArrayRef;
use crate::dict::DictRef;
use crate::error::Result;
use crate::item::Item;
use crate::value::{TypedValue, Value};

/// A recorded edit: either a replacement value or a tombstone.
#[derive(Debug, Clone)]
pub(crate) enum Change<'a> {
    Insert(Item<'a>),
    Remove,
}

/// The result of a [`MutableDict`] lookup.
#[derive(Debug)]
pub enum Entry<'m, 'a> {
    /// An edit recorded in this overlay.
    Edited(&'m Item<'a>),
    /// An untouched value read through from the source document.
    Source(Value<'a>),
}

/// A copy-on-write dict overlay.
#[derive(Debug, Clone, Default)]
pub struct MutableDict<'a> {
    source: Option<DictRef<'a>>,
    changes: BTreeMap<String, Change<'a>>,
}

impl<'a> MutableDict<'a> {
    /// Create an empty dict with no source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an overlay over an existing dict value.
    #[must_use]
    pub fn from_source(source: DictRef<'a>) -> Self {
        Self {
            source: Some(source),
            changes: BTreeMap::new(),
        }
    }

    /// Look up `key`, consulting edits first, then the source.
    ///
    /// Removed keys and keys absent from both layers yield `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns an error when the source document is malformed.
    pub fn get(&self, key: &str) -> Result<Option<Entry<'_, 'a>>> {
        match self.changes.get(key) {
            Some(Change::Remove) => Ok(None),
            Some(Change::Insert(item)) => Ok(Some(Entry::Edited(item))),
            None => match &self.source {
                Some(source) => Ok(source.get(key)?.map(Entry::Source)),
                None => Ok(None),
            },
        }
    }

    /// Set `key` to `value`.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Item<'a>>) {
        self.changes
            .insert(key.into(), Change::Insert(value.into()));
    }

    /// Remove `key`, recording a tombstone that shadows the source.
    pub fn remove(&mut self, key: impl Into<String>) {
        self.changes.insert(key.into(), Change::Remove);
    }

    /// The merged key set: source keys and edited keys, minus tombstones,
    /// in ascending order.
    ///
    /// # Errors
    ///
    /// Returns an error when the source document is malformed.
    pub fn keys(&self) -> Result<Vec<&str>> {
        Ok(self.entries()?.into_iter().map(|(k, _)| k).collect())
    }

    /// Number of entries after merging edits over the source.
    ///
    /// # Errors
    ///
    /// Returns an error when the source document is malformed.
    pub fn len(&self) -> Result<usize> {
        Ok(self.entries()?.len())
    }

    /// Check whether the merged dict has no entries.
    ///
    /// # Errors
    ///
    /// Returns an error when the source document is malformed.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.entries()?.is_empty())
    }

    /// The merged entries in ascending key order.
    ///
    /// # Errors
    ///
    /// Returns an error when the source document is malformed.
    pub fn entries(&self) -> Result<Vec<(&str, Entry<'_, 'a>)>> {
        let mut merged: BTreeMap<&str, Entry<'_, 'a>> = BTreeMap::new();
        if let Some(source) = &self.source {
            for entry in source.iter() {
                let (key, value) = entry?;
                merged.insert(key, Entry::Source(value));
            }
        }
        for (key, change) in &self.changes {
            match change {
                Change::Insert(item) => {
                    merged.insert(key.as_str(), Entry::Edited(item));
                }
                Change::Remove => {
                    merged.remove(key.as_str());
                }
            }
        }
        Ok(merged.into_iter().collect())
    }

    /// Get a mutable dict overlay for the child at `key`, promoting a source
    /// child on first call so later edits are seen by the encoder.
    ///
    /// Returns `Ok(None)` when the key is absent or the child is not a dict.
    ///
    /// # Errors
    ///
    /// Returns an error when the source document is malformed.
    pub fn get_dict_mut(&mut self, key: &str) -> Result<Option<&mut MutableDict<'a>>> {
        if !self.changes.contains_key(key) {
            let Some(promoted) = self.promote(key)? else {
                return Ok(None);
            };
            self.changes.insert(key.to_owned(), Change::Insert(promoted));
        }
        match self.changes.get_mut(key) {
            Some(Change::Insert(Item::Dict(dict))) => Ok(Some(dict)),
            _ => Ok(None),
        }
    }

    /// Get a mutable array overlay for the child at `key`, promoting a
    /// source child on first call.
    ///
    /// Returns `Ok(None)` when the key is absent or the child is not an
    /// array.
    ///
    /// # Errors
    ///
    /// Returns an error when the source document is malformed.
    pub fn get_array_mut(&mut self, key: &str) -> Result<Option<&mut MutableArray<'a>>> {
        if !self.changes.contains_key(key) {
            let Some(promoted) = self.promote(key)? else {
                return Ok(None);
            };
            self.changes.insert(key.to_owned(), Change::Insert(promoted));
        }
        match self.changes.get_mut(key) {
            Some(Change::Insert(Item::Array(array))) => Ok(Some(array)),
            _ => Ok(None),
        }
    }

    /// Build the overlay item for a source child that is a container.
    fn promote(&self, key: &str) -> Result<Option<Item<'a>>> {
        let Some(source) = &self.source else {
            return Ok(None);
        };
        let Some(child) = source.get(key)? else {
            return Ok(None);
        };
        Ok(match child.typed()? {
            TypedValue::Dict(dict) => Some(Item::Dict(MutableDict::from_source(dict))),
            TypedValue::Array(array) => Some(Item::Array(MutableArray::from_source(array)?)),
            _ => None,
        })
    }
}

/// A copy-on-write array overlay.
///
/// Unlike [`MutableDict`], the source array is materialized into an
/// in-memory sequence of reader handles at construction, so positional
/// edits are plain `Vec` operations.
#[derive(Debug, Clone, Default)]
pub struct MutableArray<'a> {
    items: Vec<Item<'a>>,
}

impl<'a> MutableArray<'a> {
    /// Create an empty array.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Materialize an existing array value into an overlay.
    ///
    /// # Errors
    ///
    /// Returns an error when the source document is malformed.
    pub fn from_source(source: ArrayRef<'a>) -> Result<Self> {
        let items = source
            .iter()
            .map(|value| value.map(Item::Source))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { items })
    }

    /// Number of elements.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check whether the array has no elements.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get the element at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Item<'a>> {
        self.items.get(index)
    }

    /// Replace the element at `index`. Returns false when out of bounds.
    pub fn set(&mut self, index: usize, value: impl Into<Item<'a>>) -> bool {
        match self.items.get_mut(index) {
            Some(slot) => {
                *slot = value.into();
                true
            }
            None => false,
        }
    }

    /// Append an element.
    pub fn push(&mut self, value: impl Into<Item<'a>>) {
        self.items.push(value.into());
    }

    /// Remove and return the last element.
    pub fn pop(&mut self) -> Option<Item<'a>> {
        self.items.pop()
    }

    /// Remove `delete_count` elements at `start` and insert `replacement`
    /// there, returning the removed elements. Ranges are clamped to the
    /// array bounds.
    pub fn splice(
        &mut self,
        start: usize,
        delete_count: usize,
        replacement: Vec<Item<'a>>,
    ) -> Vec<Item<'a>> {
        let start = start.min(self.items.len());
        let end = start.saturating_add(delete_count).min(self.items.len());
        self.items.splice(start..end, replacement).collect()
    }

    /// Iterate over the elements.
    pub fn iter(&self) -> impl Iterator<Item = &Item<'a>> {
        self.items.iter()
    }

    /// Get a mutable dict overlay for the element at `index`, promoting a
    /// source child in place on first call.
    ///
    /// Returns `Ok(None)` when out of bounds or the element is not a dict.
    ///
    /// # Errors
    ///
    /// Returns an error when the source document is malformed.
    pub fn get_dict_mut(&mut self, index: usize) -> Result<Option<&mut MutableDict<'a>>> {
        let Some(slot) = self.items.get_mut(index) else {
            return Ok(None);
        };
        if let Item::Source(value) = slot
            && let TypedValue::Dict(dict) = value.typed()?
        {
            *slot = Item::Dict(MutableDict::from_source(dict));
        }
        match slot {
            Item::Dict(dict) => Ok(Some(dict)),
            _ => Ok(None),
        }
    }

    /// Get a mutable array overlay for the element at `index`, promoting a
    /// source child in place on first call.
    ///
    /// Returns `Ok(None)` when out of bounds or the element is not an array.
    ///
    /// # Errors
    ///
    /// Returns an error when the source document is malformed.
    pub fn get_array_mut(&mut self, index: usize) -> Result<Option<&mut MutableArray<'a>>> {
        let Some(slot) = self.items.get_mut(index) else {
            return Ok(None);
        };
        if let Item::Source(value) = slot
            && let TypedValue::Array(array) = value.typed()?
        {
            *slot = Item::Array(MutableArray::from_source(array)?);
        }
        match slot {
            Item::Array(array) => Ok(Some(array)),
            _ => Ok(None),
        }
    }
}

impl<'a> FromIterator<Item<'a>> for MutableArray<'a> {
    fn from_iter<I: IntoIterator<Item = Item<'a>>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}
