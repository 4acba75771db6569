//! Bottom-up encoding of [`Item`] trees into document bytes.
//!
//! The encoder writes leaves first and collections after their elements, so
//! every pointer in the output reaches backward. Equal strings are interned
//! within one pass: later occurrences emit only a pointer slot.
//!
//! With [`Encoder::set_base`] the encoder produces a *delta*: a suffix that
//! is a valid document when appended to the base buffer. All recorded
//! offsets are absolute within that concatenation, and [`Item::Source`]
//! handles borrowed from the base serialize as back-pointers into it
//! instead of copies.
//!
//! ```
//! use shale::{Item, Value, encode};
//!
//! let doc = encode(&Item::Int(42)).unwrap();
//! let root = Value::from_doc(&doc).unwrap();
//! assert_eq!(root.as_int().unwrap(), 42);
//! ```

use std::collections::HashMap;

use crate::error::Result;
use crate::item::Item;
use crate::mutable::{Entry, MutableArray, MutableDict};
use crate::tag::{
    COUNT_OVERFLOW, LENGTH_OVERFLOW, MAX_NARROW_REACH, SPECIAL_FALSE, SPECIAL_NULL, SPECIAL_TRUE,
    TAG_ARRAY, TAG_BINARY, TAG_DICT, TAG_FLOAT, TAG_INT, TAG_STRING, encode_collection_header,
    encode_narrow_pointer, encode_wide_pointer, minimal_int_width, write_varint,
};
use crate::value::{TypedValue, Value};

/// A pending collection slot: two inline bytes, or the absolute offset of
/// an out-of-line target to be converted into a pointer at write time.
#[derive(Debug, Clone, Copy)]
enum Slot {
    Immediate([u8; 2]),
    Pointer(usize),
}

/// Serializes [`Item`] trees into self-contained documents or delta
/// suffixes.
pub struct Encoder<'b> {
    out: Vec<u8>,
    /// First absolute offset of each interned string payload.
    strings: HashMap<String, usize>,
    base: Option<&'b [u8]>,
}

impl Default for Encoder<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'b> Encoder<'b> {
    /// Create an encoder with no base buffer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            out: Vec::with_capacity(1024),
            strings: HashMap::new(),
            base: None,
        }
    }

    /// Register `base` as the immutable prefix for subsequent [`encode`]
    /// calls: the returned bytes are then valid only as a suffix appended
    /// to `base`.
    ///
    /// [`encode`]: Encoder::encode
    pub fn set_base(&mut self, base: &'b [u8]) {
        self.base = Some(base);
    }

    #[inline]
    fn base_len(&self) -> usize {
        self.base.map_or(0, <[u8]>::len)
    }

    /// Current write position, absolute within the final concatenated
    /// document.
    #[inline]
    fn abs(&self) -> usize {
        self.base_len() + self.out.len()
    }

    /// Pad so the next value starts on an even absolute offset.
    fn pad(&mut self) {
        if self.abs() % 2 != 0 {
            self.out.push(0);
        }
    }

    /// Encode `item`, returning the bytes for this pass only.
    ///
    /// Without a base the result is a complete document. With one, the
    /// concatenation `base || result` is, and unchanged subtrees referenced
    /// through [`Item::Source`] handles are reused via back-pointers.
    ///
    /// # Errors
    ///
    /// Returns an error when a [`Item::Source`] handle reads from a
    /// malformed document.
    pub fn encode(&mut self, item: &Item<'_>) -> Result<Vec<u8>> {
        self.out.clear();
        self.out.reserve(1024);
        self.strings.clear();
        let root = self.write_item(item)?;
        self.finish_root(root);
        Ok(std::mem::take(&mut self.out))
    }

    fn write_item(&mut self, item: &Item<'_>) -> Result<Slot> {
        match item {
            Item::Null => Ok(Slot::Immediate([SPECIAL_NULL, 0])),
            Item::Bool(true) => Ok(Slot::Immediate([SPECIAL_TRUE, 0])),
            Item::Bool(false) => Ok(Slot::Immediate([SPECIAL_FALSE, 0])),
            Item::Int(v) => Ok(self.write_int(*v)),
            Item::Float(v) => Ok(self.write_float(*v)),
            Item::Str(s) => Ok(self.write_str(s)),
            Item::Bytes(b) => Ok(self.write_bin(b)),
            Item::Array(array) => self.write_mutable_array(array),
            Item::Dict(dict) => self.write_mutable_dict(dict),
            Item::Source(value) => self.write_source(*value),
        }
    }

    /// Serialize a reader handle: inline when its minimal encoding fits a
    /// slot, as a back-pointer when it lives in the base buffer, and as a
    /// recursive copy otherwise.
    fn write_source(&mut self, value: Value<'_>) -> Result<Slot> {
        if let Some(bytes) = value.inline_bytes() {
            return Ok(Slot::Immediate(bytes));
        }
        if let Some(base) = self.base
            && base.as_ptr() == value.data().as_ptr()
            && base.len() == value.data().len()
        {
            return Ok(Slot::Pointer(value.pos()));
        }
        match value.typed()? {
            TypedValue::Null => Ok(Slot::Immediate([SPECIAL_NULL, 0])),
            TypedValue::Bool(true) => Ok(Slot::Immediate([SPECIAL_TRUE, 0])),
            TypedValue::Bool(false) => Ok(Slot::Immediate([SPECIAL_FALSE, 0])),
            TypedValue::Int(n) => Ok(self.write_int(n)),
            TypedValue::Float(f) => Ok(self.write_float(f)),
            TypedValue::Str(s) => Ok(self.write_str(s)),
            TypedValue::Bytes(b) => Ok(self.write_bin(b)),
            TypedValue::Array(array) => {
                let mut slots = Vec::with_capacity(array.len());
                for child in array.iter() {
                    let slot = self.write_source(child?)?;
                    slots.push(slot);
                }
                Ok(self.write_collection(TAG_ARRAY, slots.len(), &slots))
            }
            TypedValue::Dict(dict) => {
                let mut slots = Vec::with_capacity(dict.len() * 2);
                let mut count = 0;
                for entry in dict.iter() {
                    let (key, child) = entry?;
                    let key_slot = self.write_str(key);
                    let value_slot = self.write_source(child)?;
                    slots.push(key_slot);
                    slots.push(value_slot);
                    count += 1;
                }
                Ok(self.write_collection(TAG_DICT, count, &slots))
            }
        }
    }

    fn write_mutable_array(&mut self, array: &MutableArray<'_>) -> Result<Slot> {
        let mut slots = Vec::with_capacity(array.len());
        for item in array.iter() {
            let slot = self.write_item(item)?;
            slots.push(slot);
        }
        Ok(self.write_collection(TAG_ARRAY, slots.len(), &slots))
    }

    /// Write a dict's entries bottom-up in key order. The merged view is
    /// already sorted, so the emitted keys satisfy the binary-search
    /// invariant even when edits changed the key set.
    fn write_mutable_dict(&mut self, dict: &MutableDict<'_>) -> Result<Slot> {
        let entries = dict.entries()?;
        let mut slots = Vec::with_capacity(entries.len() * 2);
        for (key, entry) in &entries {
            let key_slot = self.write_str(key);
            let value_slot = match entry {
                Entry::Edited(item) => self.write_item(item)?,
                Entry::Source(value) => self.write_source(*value)?,
            };
            slots.push(key_slot);
            slots.push(value_slot);
        }
        Ok(self.write_collection(TAG_DICT, entries.len(), &slots))
    }

    fn write_int(&mut self, value: i64) -> Slot {
        if (-2048..=2047).contains(&value) {
            return Slot::Immediate([(value >> 8) as u8 & 0x0F, value as u8]);
        }
        self.pad();
        let target = self.abs();
        let width = minimal_int_width(value);
        self.out.push((TAG_INT << 4) | (width as u8 - 1));
        self.out.extend_from_slice(&value.to_le_bytes()[..width]);
        Slot::Pointer(target)
    }

    fn write_float(&mut self, value: f64) -> Slot {
        self.pad();
        let target = self.abs();
        self.out.extend_from_slice(&[(TAG_FLOAT << 4) | 0x08, 0]);
        self.out.extend_from_slice(&value.to_le_bytes());
        Slot::Pointer(target)
    }

    fn write_str(&mut self, s: &str) -> Slot {
        let bytes = s.as_bytes();
        if bytes.len() <= 1 {
            return Slot::Immediate([
                (TAG_STRING << 4) | bytes.len() as u8,
                bytes.first().copied().unwrap_or(0),
            ]);
        }
        if let Some(&target) = self.strings.get(s) {
            return Slot::Pointer(target);
        }
        let target = self.write_blob(TAG_STRING, bytes);
        self.strings.insert(s.to_owned(), target);
        Slot::Pointer(target)
    }

    fn write_bin(&mut self, data: &[u8]) -> Slot {
        if data.len() <= 1 {
            return Slot::Immediate([
                (TAG_BINARY << 4) | data.len() as u8,
                data.first().copied().unwrap_or(0),
            ]);
        }
        Slot::Pointer(self.write_blob(TAG_BINARY, data))
    }

    fn write_blob(&mut self, tag: u8, data: &[u8]) -> usize {
        self.pad();
        let target = self.abs();
        if data.len() < LENGTH_OVERFLOW as usize {
            self.out.push((tag << 4) | data.len() as u8);
        } else {
            self.out.push((tag << 4) | LENGTH_OVERFLOW);
            write_varint(&mut self.out, data.len() as u64);
        }
        self.out.extend_from_slice(data);
        target
    }

    /// Emit a collection header and its finalized slots.
    ///
    /// The narrow/wide decision happens here: each slot's absolute position
    /// is known once the header is down, and if any pointer's backward
    /// distance at narrow spacing would overflow a 15-bit offset, the whole
    /// collection switches to 4-byte slots.
    fn write_collection(&mut self, tag: u8, count: usize, slots: &[Slot]) -> Slot {
        self.pad();
        let target = self.abs();
        let header_at = self.out.len();
        if count < COUNT_OVERFLOW {
            self.out
                .extend_from_slice(&encode_collection_header(tag, false, count));
        } else {
            self.out
                .extend_from_slice(&encode_collection_header(tag, false, COUNT_OVERFLOW));
            let varint_len = write_varint(&mut self.out, count as u64);
            if varint_len % 2 != 0 {
                self.out.push(0);
            }
        }
        let slots_base = self.abs();
        let wide = slots.iter().enumerate().any(|(i, slot)| match slot {
            Slot::Pointer(t) => slots_base + 2 * i - t > MAX_NARROW_REACH,
            Slot::Immediate(_) => false,
        });
        if wide {
            self.out[header_at] |= 0x08;
        }
        for slot in slots {
            let pos = self.abs();
            match slot {
                Slot::Immediate(bytes) => {
                    self.out.extend_from_slice(bytes);
                    if wide {
                        self.out.extend_from_slice(&[0, 0]);
                    }
                }
                Slot::Pointer(t) => {
                    let units = (pos - t) / 2;
                    if wide {
                        self.out.extend_from_slice(&encode_wide_pointer(units as u32));
                    } else {
                        self.out.extend_from_slice(&encode_narrow_pointer(units as u16));
                    }
                }
            }
        }
        Slot::Pointer(target)
    }

    /// Write the trailing root slot. A root beyond narrow reach gets one
    /// wide pointer first, with the final narrow slot pointing 2 units back
    /// at it.
    fn finish_root(&mut self, root: Slot) {
        self.pad();
        match root {
            Slot::Immediate(bytes) => self.out.extend_from_slice(&bytes),
            Slot::Pointer(target) => {
                let distance = self.abs() - target;
                if distance > MAX_NARROW_REACH {
                    self.out
                        .extend_from_slice(&encode_wide_pointer((distance / 2) as u32));
                    self.out.extend_from_slice(&encode_narrow_pointer(2));
                } else {
                    self.out
                        .extend_from_slice(&encode_narrow_pointer((distance / 2) as u16));
                }
            }
        }
    }
}

/// Encode `item` as a self-contained document.
///
/// # Errors
///
/// Returns an error when a [`Item::Source`] handle reads from a malformed
/// document.
pub fn encode(item: &Item<'_>) -> Result<Vec<u8>> {
    Encoder::new().encode(item)
}

/// Encode `item` as a delta suffix against `base`: the concatenation
/// `base || result` is a valid document.
///
/// # Errors
///
/// Returns an error when a [`Item::Source`] handle reads from a malformed
/// document.
pub fn encode_delta(base: &[u8], item: &Item<'_>) -> Result<Vec<u8>> {
    let mut encoder = Encoder::new();
    encoder.set_base(base);
    encoder.encode(item)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn test_encode_null() {
        let doc = encode(&Item::Null).unwrap();
        assert_eq!(doc, vec![0x30, 0x00]);
        assert!(Value::from_doc(&doc).unwrap().is_null());
    }

    #[test]
    fn test_encode_bools() {
        assert_eq!(encode(&Item::Bool(false)).unwrap(), vec![0x34, 0x00]);
        assert_eq!(encode(&Item::Bool(true)).unwrap(), vec![0x38, 0x00]);
    }

    #[test]
    fn test_encode_small_ints() {
        // -1 is a small-int immediate with field 0xFFF.
        assert_eq!(encode(&Item::Int(-1)).unwrap(), vec![0x0F, 0xFF]);
        assert_eq!(encode(&Item::Int(0)).unwrap(), vec![0x00, 0x00]);
        assert_eq!(encode(&Item::Int(2047)).unwrap(), vec![0x07, 0xFF]);
        assert_eq!(encode(&Item::Int(-2048)).unwrap(), vec![0x08, 0x00]);
    }

    #[test]
    fn test_encode_long_ints() {
        // 0x1234 takes 2 payload bytes plus a pointer root slot.
        let doc = encode(&Item::Int(0x1234)).unwrap();
        assert_eq!(&doc[..3], &[0x11, 0x34, 0x12]);
        assert_eq!(Value::from_doc(&doc).unwrap().as_int().unwrap(), 0x1234);

        for value in [2048i64, -2049, i32::MAX as i64 + 1, i64::MAX, i64::MIN] {
            let doc = encode(&Item::Int(value)).unwrap();
            assert_eq!(Value::from_doc(&doc).unwrap().as_int().unwrap(), value);
        }
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn test_encode_float() {
        let doc = encode(&Item::Float(1.5)).unwrap();
        assert_eq!(&doc[..2], &[0x28, 0x00]);
        assert_eq!(doc.len(), 12); // header + 8 payload + root slot
        assert_eq!(Value::from_doc(&doc).unwrap().as_float().unwrap(), 1.5);

        // Bit-equal round-trip for an inexact value.
        let doc = encode(&Item::Float(0.1)).unwrap();
        let read = Value::from_doc(&doc).unwrap().as_float().unwrap();
        assert_eq!(read.to_bits(), 0.1f64.to_bits());
    }

    #[test]
    fn test_encode_strings() {
        // Tiny strings inline in the root slot.
        assert_eq!(encode(&Item::from("")).unwrap(), vec![0x40, 0x00]);
        assert_eq!(encode(&Item::from("x")).unwrap(), vec![0x41, b'x']);

        let doc = encode(&Item::from("hello")).unwrap();
        assert_eq!(&doc[..6], &[0x45, b'h', b'e', b'l', b'l', b'o']);
        assert_eq!(Value::from_doc(&doc).unwrap().as_str().unwrap(), "hello");

        // Varint length at 15 bytes and beyond.
        let long = "abcdefghijklmnop";
        let doc = encode(&Item::from(long)).unwrap();
        assert_eq!(&doc[..2], &[0x4F, 0x10]);
        assert_eq!(Value::from_doc(&doc).unwrap().as_str().unwrap(), long);
    }

    #[test]
    fn test_encode_binary() {
        let doc = encode(&Item::bytes(vec![0xAA, 0xBB, 0xCC])).unwrap();
        assert_eq!(&doc[..4], &[0x53, 0xAA, 0xBB, 0xCC]);
        assert_eq!(
            Value::from_doc(&doc).unwrap().as_bytes().unwrap(),
            &[0xAA, 0xBB, 0xCC]
        );
    }

    #[test]
    fn test_encode_dict_layout() {
        let mut dict = MutableDict::new();
        dict.set("b", 2);
        dict.set("a", 1);
        let doc = encode(&dict.into()).unwrap();
        // Sorted entries, four 2-byte slots after the header, pointer root.
        assert_eq!(
            doc,
            vec![0x70, 0x02, 0x41, b'a', 0x00, 0x01, 0x41, b'b', 0x00, 0x02, 0x80, 0x05]
        );

        let root = Value::from_doc(&doc).unwrap().as_dict().unwrap();
        assert_eq!(root.get("b").unwrap().unwrap().as_int().unwrap(), 2);
    }

    #[test]
    fn test_interning() {
        let mut array = MutableArray::new();
        for _ in 0..3 {
            array.push("foo");
        }
        let doc = encode(&array.into()).unwrap();
        // One payload and three pointer slots.
        assert_eq!(
            doc,
            vec![0x43, b'f', b'o', b'o', 0x60, 0x03, 0x80, 0x03, 0x80, 0x04, 0x80, 0x05, 0x80, 0x04]
        );
    }

    #[test]
    fn test_alignment_padding() {
        // "abc" (4 bytes) then "hello" (6 bytes, already even) then a
        // 3-byte payload forcing a pad before the array header.
        let mut array = MutableArray::new();
        array.push("abc");
        array.push(Item::bytes(vec![1u8, 2]));
        let doc = encode(&array.into()).unwrap();
        let root = Value::from_doc(&doc).unwrap().as_array().unwrap();
        assert_eq!(root.get(0).unwrap().unwrap().as_str().unwrap(), "abc");
        assert_eq!(root.get(1).unwrap().unwrap().as_bytes().unwrap(), &[1, 2]);
        // Every out-of-line value sits on an even offset.
        assert_eq!(root.get(0).unwrap().unwrap().pos() % 2, 0);
        assert_eq!(root.get(1).unwrap().unwrap().pos() % 2, 0);
    }

    #[test]
    fn test_nested_navigation() {
        let mut level3 = MutableArray::new();
        level3.push(1);
        level3.push(2);
        level3.push(3);
        let mut level2 = MutableDict::new();
        level2.set("level3", level3);
        let mut level1 = MutableDict::new();
        level1.set("level2", level2);
        let mut root = MutableDict::new();
        root.set("level1", level1);

        let doc = encode(&root.into()).unwrap();
        let value = Value::from_doc(&doc)
            .unwrap()
            .as_dict()
            .unwrap()
            .get("level1")
            .unwrap()
            .unwrap()
            .as_dict()
            .unwrap()
            .get("level2")
            .unwrap()
            .unwrap()
            .as_dict()
            .unwrap()
            .get("level3")
            .unwrap()
            .unwrap()
            .as_array()
            .unwrap()
            .get(1)
            .unwrap()
            .unwrap();
        assert_eq!(value.as_int().unwrap(), 2);
    }

    #[test]
    fn test_wide_promotion() {
        // Two big strings push the collection's first pointer past narrow
        // reach.
        let mut array = MutableArray::new();
        array.push("A".repeat(40_000));
        array.push("B".repeat(40_000));
        let doc = encode(&array.into()).unwrap();

        let root = Value::from_doc(&doc).unwrap().as_array().unwrap();
        let header = doc[root.pos()];
        assert_eq!(header & 0x08, 0x08, "collection should be wide");
        assert_eq!(root.get(0).unwrap().unwrap().as_str().unwrap().len(), 40_000);
        assert_eq!(root.get(1).unwrap().unwrap().as_str().unwrap().len(), 40_000);
    }

    #[test]
    fn test_root_wide_indirection() {
        // A root value more than 65534 bytes from the root slot.
        let doc = encode(&Item::from("x".repeat(70_000))).unwrap();
        // Final narrow slot points 2 units back at a wide pointer.
        assert_eq!(&doc[doc.len() - 2..], &[0x80, 0x02]);
        let root = Value::from_doc(&doc).unwrap();
        assert_eq!(root.as_str().unwrap().len(), 70_000);
        assert_eq!(root.pos(), 0);
    }
}
