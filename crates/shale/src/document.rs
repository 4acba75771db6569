//! Document wrapper over a validated byte buffer.
//!
//! A document is self-delimited: its last two bytes are the root slot. A
//! [`Document`] opened from a borrowed slice reads zero-copy; appending a
//! delta suffix triggers allocation via `Cow::to_mut()`, after which the
//! buffer is owned.

use std::borrow::Cow;

use crate::error::Result;
use crate::value::Value;

/// A shale document with zero-copy reading and append-only updates.
pub struct Document<'a> {
    /// The document buffer - borrowed for reads, owned once extended.
    data: Cow<'a, [u8]>,
}

impl<'a> Document<'a> {
    /// Open an existing document from a byte slice (zero-copy).
    ///
    /// # Errors
    ///
    /// Returns an error when the buffer is too small, oddly sized, or its
    /// root slot does not resolve.
    pub fn from_slice(data: &'a [u8]) -> Result<Self> {
        Value::from_doc(data)?;
        Ok(Self {
            data: Cow::Borrowed(data),
        })
    }

    /// Take ownership of encoded document bytes.
    ///
    /// # Errors
    ///
    /// Returns an error when the bytes do not form a valid document.
    pub fn new(data: Vec<u8>) -> Result<Document<'static>> {
        Value::from_doc(&data)?;
        Ok(Document {
            data: Cow::Owned(data),
        })
    }

    /// Get the root value.
    ///
    /// # Panics
    ///
    /// Cannot panic for documents built through [`from_slice`], [`new`], or
    /// [`push_delta`], all of which validate the root slot.
    ///
    /// [`from_slice`]: Document::from_slice
    /// [`new`]: Document::new
    /// [`push_delta`]: Document::push_delta
    #[must_use]
    pub fn root(&self) -> Value<'_> {
        Value::from_doc(self.data.as_ref()).expect("root validated on construction")
    }

    /// Get the raw document bytes.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.data.as_ref()
    }

    /// Get the document length in bytes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the document is empty (never true for valid documents).
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Append a delta suffix produced against this document's bytes as
    /// base. The suffix's root slot becomes the document root.
    ///
    /// Triggers allocation on first use if the document was opened from a
    /// borrowed slice.
    ///
    /// # Errors
    ///
    /// Returns an error when the combined buffer is not a valid document;
    /// the document is rolled back to its previous state.
    pub fn push_delta(&mut self, delta: &[u8]) -> Result<()> {
        let vec = self.data.to_mut();
        let old_len = vec.len();
        vec.extend_from_slice(delta);
        if let Err(err) = Value::from_doc(self.data.as_ref()) {
            self.data.to_mut().truncate(old_len);
            return Err(err);
        }
        Ok(())
    }

    /// Check if the document owns its buffer.
    #[inline]
    #[must_use]
    pub fn is_modified(&self) -> bool {
        matches!(self.data, Cow::Owned(_))
    }

    /// Convert to an owned document with `'static` lifetime.
    #[must_use]
    pub fn into_owned(self) -> Document<'static> {
        Document {
            data: Cow::Owned(self.data.into_owned()),
        }
    }
}

impl std::fmt::Debug for Document<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("len", &self.data.len())
            .field("root", &self.root())
            .field("is_modified", &self.is_modified())
            .finish()
    }
}
