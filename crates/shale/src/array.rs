//! Array views: indexed access over fixed-width slots.

use crate::error::Result;
use crate::value::{Value, collection_parts};

/// Zero-copy view into an array value.
///
/// Slots are 2 bytes in a narrow array and 4 bytes in a wide one; each
/// holds either an inline value or a backward pointer, dereferenced
/// transparently by [`get`](ArrayRef::get).
#[derive(Clone, Copy)]
pub struct ArrayRef<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ArrayRef<'a> {
    #[inline]
    pub(crate) fn new(data: &'a [u8], pos: usize) -> Self {
        Self { data, pos }
    }

    /// Position of the array header within the buffer.
    #[inline]
    #[must_use]
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Number of elements. Returns 0 when the count field is unreadable.
    #[must_use]
    pub fn len(&self) -> usize {
        collection_parts(self.data, self.pos)
            .map(|(_, count, _)| count)
            .unwrap_or(0)
    }

    /// Check whether the array has no elements.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the element at `index`, or `Ok(None)` when out of bounds.
    ///
    /// # Errors
    ///
    /// Returns an error when the header or a slot's pointer chain is
    /// malformed.
    pub fn get(&self, index: usize) -> Result<Option<Value<'a>>> {
        let (wide, count, data_pos) = collection_parts(self.data, self.pos)?;
        if index >= count {
            return Ok(None);
        }
        let slot_size = if wide { 4 } else { 2 };
        let value = Value::new_at(self.data, data_pos + index * slot_size, wide)?;
        Ok(Some(value))
    }

    /// Iterate over the elements in order.
    #[must_use]
    pub fn iter(&self) -> ArrayIter<'a> {
        let (wide, count, data_pos) = match collection_parts(self.data, self.pos) {
            Ok(parts) => parts,
            Err(_) => (false, 0, self.pos),
        };
        ArrayIter {
            data: self.data,
            slot_pos: data_pos,
            remaining: count,
            wide,
        }
    }
}

impl<'r, 'a> IntoIterator for &'r ArrayRef<'a> {
    type Item = Result<Value<'a>>;
    type IntoIter = ArrayIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl std::fmt::Debug for ArrayRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArrayRef")
            .field("pos", &format_args!("{:#x}", self.pos))
            .field("len", &self.len())
            .finish()
    }
}

/// Iterator over array elements.
pub struct ArrayIter<'a> {
    data: &'a [u8],
    slot_pos: usize,
    remaining: usize,
    wide: bool,
}

impl<'a> Iterator for ArrayIter<'a> {
    type Item = Result<Value<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let value = Value::new_at(self.data, self.slot_pos, self.wide);
        self.slot_pos += if self.wide { 4 } else { 2 };
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for ArrayIter<'_> {}
