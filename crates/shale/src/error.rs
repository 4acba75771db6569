//! Error types for shale operations.

use std::fmt;

/// Error type for shale operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    // Document errors
    /// Document is too small to contain a root slot.
    DocumentTooSmall,
    /// Document length is odd; every valid document is 2-byte aligned.
    UnalignedDocument,

    // Pointer errors
    /// Pointer slot with an offset of zero.
    ZeroPointerOffset { pos: usize },
    /// Pointer reaches before the start of the buffer.
    PointerOutOfBounds { pos: usize, units: usize },
    /// Pointer chain exceeded the dereference cap.
    PointerChainTooLong,

    // Value errors
    /// Value data is truncated (not enough bytes).
    TruncatedValue,
    /// String value contains invalid UTF-8.
    InvalidUtf8,
    /// Accessor called on a value of the wrong kind.
    UnexpectedType {
        expected: &'static str,
        found: &'static str,
    },
    /// Unsigned integer does not fit a 64-bit signed value.
    IntOutOfRange,

    // JSON errors
    /// Failed to parse JSON input.
    JsonParse(String),
    /// Failed to serialize to JSON.
    JsonSerialize(String),
    /// f64 is NaN or Infinity (not representable in JSON).
    NonFiniteFloat(f64),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::DocumentTooSmall => write!(f, "document too small for a root slot"),
            Error::UnalignedDocument => write!(f, "document length is odd"),
            Error::ZeroPointerOffset { pos } => {
                write!(f, "pointer at {pos:#x} has zero offset")
            }
            Error::PointerOutOfBounds { pos, units } => {
                write!(f, "pointer at {pos:#x} reaches {units} units before the buffer")
            }
            Error::PointerChainTooLong => write!(f, "pointer chain too long"),
            Error::TruncatedValue => write!(f, "truncated value data"),
            Error::InvalidUtf8 => write!(f, "invalid UTF-8 in string value"),
            Error::UnexpectedType { expected, found } => {
                write!(f, "expected {expected}, found {found}")
            }
            Error::IntOutOfRange => write!(f, "unsigned integer out of i64 range"),
            Error::JsonParse(msg) => write!(f, "JSON parse error: {msg}"),
            Error::JsonSerialize(msg) => write!(f, "JSON serialize error: {msg}"),
            Error::NonFiniteFloat(n) => write!(f, "cannot convert non-finite float {n} to JSON"),
        }
    }
}

impl std::error::Error for Error {}

/// Result type alias for shale operations.
pub type Result<T> = std::result::Result<T, Error>;
