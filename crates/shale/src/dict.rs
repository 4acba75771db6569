//! Dict views: key lookup by binary search over sorted key slots.
//!
//! Dict entries are interleaved key/value slot pairs with keys in strictly
//! ascending byte order, so a single lookup probes O(log n) keys without
//! touching the rest of the document.

use std::cmp::Ordering;

use crate::error::Result;
use crate::value::{Value, collection_parts};

/// Zero-copy view into a dict value.
#[derive(Clone, Copy)]
pub struct DictRef<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> DictRef<'a> {
    #[inline]
    pub(crate) fn new(data: &'a [u8], pos: usize) -> Self {
        Self { data, pos }
    }

    /// Position of the dict header within the buffer.
    #[inline]
    #[must_use]
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Number of entries. Returns 0 when the count field is unreadable.
    #[must_use]
    pub fn len(&self) -> usize {
        collection_parts(self.data, self.pos)
            .map(|(_, count, _)| count)
            .unwrap_or(0)
    }

    /// Check whether the dict has no entries.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up `key` by binary search, or `Ok(None)` when absent.
    ///
    /// # Errors
    ///
    /// Returns an error when the header is malformed, a probed key is not a
    /// string, or a slot's pointer chain is invalid.
    pub fn get(&self, key: &str) -> Result<Option<Value<'a>>> {
        let (wide, count, data_pos) = collection_parts(self.data, self.pos)?;
        let slot_size = if wide { 4 } else { 2 };
        let mut lo = 0usize;
        let mut hi = count;
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            let key_pos = data_pos + mid * 2 * slot_size;
            let probe = Value::new_at(self.data, key_pos, wide)?.as_str()?;
            match probe.cmp(key) {
                Ordering::Less => lo = mid + 1,
                Ordering::Greater => hi = mid,
                Ordering::Equal => {
                    let value = Value::new_at(self.data, key_pos + slot_size, wide)?;
                    return Ok(Some(value));
                }
            }
        }
        Ok(None)
    }

    /// Iterate over `(key, value)` entries in key order.
    #[must_use]
    pub fn iter(&self) -> DictIter<'a> {
        let (wide, count, data_pos) = match collection_parts(self.data, self.pos) {
            Ok(parts) => parts,
            Err(_) => (false, 0, self.pos),
        };
        DictIter {
            data: self.data,
            slot_pos: data_pos,
            remaining: count,
            wide,
        }
    }

    /// Iterate over the keys in order.
    pub fn keys(&self) -> impl Iterator<Item = Result<&'a str>> {
        self.iter().map(|entry| entry.map(|(k, _)| k))
    }
}

impl<'r, 'a> IntoIterator for &'r DictRef<'a> {
    type Item = Result<(&'a str, Value<'a>)>;
    type IntoIter = DictIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl std::fmt::Debug for DictRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DictRef")
            .field("pos", &format_args!("{:#x}", self.pos))
            .field("len", &self.len())
            .finish()
    }
}

/// Iterator over dict entries.
pub struct DictIter<'a> {
    data: &'a [u8],
    slot_pos: usize,
    remaining: usize,
    wide: bool,
}

impl<'a> Iterator for DictIter<'a> {
    type Item = Result<(&'a str, Value<'a>)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let slot_size = if self.wide { 4 } else { 2 };
        let entry = Value::new_at(self.data, self.slot_pos, self.wide)
            .and_then(|k| k.as_str())
            .and_then(|key| {
                let value = Value::new_at(self.data, self.slot_pos + slot_size, self.wide)?;
                Ok((key, value))
            });
        self.slot_pos += 2 * slot_size;
        Some(entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for DictIter<'_> {}
