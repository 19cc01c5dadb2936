use std::io;

use thiserror::Error;

use crate::{Field, HEADER_SIZE};

/// Errors produced while reading a header.
///
/// Every error except [`Error::Faulted`] is returned at most once per reader:
/// after it the reader is faulted and every later call fails with
/// [`Error::Faulted`]. The one exception is a read cancelled before it took
/// any byte, which leaves the reader ready for the next header.
#[derive(Debug, Error)]
pub enum Error {
    /// The source reached end-of-data before a whole header block was read.
    #[error("truncated header: source ended after {read} of {} bytes", HEADER_SIZE)]
    TruncatedHeader {
        /// Bytes of the header taken before the source ran dry.
        read: usize,
    },

    /// A field of the header could not be decoded.
    #[error("invalid `{field}` field: {source}")]
    InvalidField {
        /// The field that failed.
        field: Field,
        /// Why it failed.
        source: FieldError,
    },

    /// The stored checksum does not match the bytes of the header block.
    #[error("checksum mismatch: header stores {expected}, computed {computed}")]
    ChecksumMismatch {
        /// Value of the `chksum` field.
        expected: u64,
        /// Sum of the header bytes.
        computed: u64,
    },

    /// The read was cancelled while waiting for the source.
    #[error("header read cancelled")]
    Cancelled,

    /// An earlier read failed, the reader no longer knows where the next
    /// header starts.
    #[error("reader is faulted by an earlier error")]
    Faulted,

    /// The underlying source failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Returns the field that failed to decode, if the error concerns one.
    pub fn field(&self) -> Option<Field> {
        match *self {
            Error::InvalidField { field, .. } => Some(field),
            _ => None,
        }
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> io::Error {
        match err {
            Error::Io(e) => e,
            e @ Error::TruncatedHeader { .. } => io::Error::new(io::ErrorKind::UnexpectedEof, e),
            e @ Error::Cancelled => io::Error::new(io::ErrorKind::Interrupted, e),
            e => io::Error::new(io::ErrorKind::InvalidData, e),
        }
    }
}

/// Why the bytes of a single field could not be decoded or encoded.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FieldError {
    /// A text field holds a byte outside of 7-bit ASCII.
    #[error("non-ASCII byte {byte:#04x} at position {position}")]
    NonAscii {
        /// The offending byte.
        byte: u8,
        /// Its position within the field.
        position: usize,
    },

    /// A numeric field is empty or holds something other than octal digits.
    #[error("malformed octal number {value:?}")]
    MalformedNumeric {
        /// The field contents after trimming, lossily decoded.
        value: String,
    },

    /// A timestamp does not fit the timestamp type.
    #[error("timestamp {seconds} is out of range")]
    TimestampOutOfRange {
        /// Decoded seconds since the epoch.
        seconds: u64,
    },

    /// A value is too long for the field it is encoded into.
    #[error("value needs {len} bytes but the field holds {capacity}")]
    Overflow {
        /// Bytes needed.
        len: usize,
        /// Length of the field.
        capacity: usize,
    },

    /// A character has no single-byte encoding.
    #[error("character {0:?} cannot be encoded in a single byte")]
    Unrepresentable(char),
}

/// Result type used throughout this crate.
pub type Result<T> = std::result::Result<T, Error>;
