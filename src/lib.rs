//! A streaming decoder for tar entry headers
//!
//! This library decodes the 512-byte UStar header block [1] that precedes
//! every entry of a tar archive, reading it field by field from any buffered
//! source: a file, a socket, the output of a decompressor. Great strides are
//! taken to ensure that neither the archive nor even a whole header is ever
//! required to be resident in memory; a reader copies out one field at a
//! time and hands every other byte straight back to its source.
//!
//! [`HeaderReader`] reads from a `std::io::BufRead`. With the `async`
//! feature (on by default) [`AsyncHeaderReader`] reads from a
//! `tokio::io::AsyncBufRead` and supports cooperative cancellation. Both
//! drive the same [`HeaderDecoder`], which performs no I/O and can be fed by
//! hand.
//!
//! Only the header block is decoded. Walking the entries of an archive,
//! extracting their data, and GNU or pax extensions are left to the caller.
//!
//! [1]: https://en.wikipedia.org/wiki/Tar_%28computing%29#UStar_format
//!
//! # Examples
//!
//! ```
//! use ustar_stream::HeaderReader;
//!
//! let mut block = [0u8; 512];
//! block[..9].copy_from_slice(b"hello.txt");
//! block[124..136].copy_from_slice(b"00000000015\0");
//! block[156] = b'0';
//!
//! let mut reader = HeaderReader::new(&block[..]);
//! let header = reader.read_header().unwrap();
//! assert_eq!(header.name(), "hello.txt");
//! assert_eq!(header.size(), 13);
//! assert!(header.entry_type().is_file());
//! ```

#![deny(missing_docs)]

pub use crate::decoder::{HeaderDecoder, Progress, ReaderState};
pub use crate::entry_type::EntryType;
pub use crate::error::{Error, FieldError, Result};
pub use crate::field::{
    decode_entry_type, decode_octal_timestamp, decode_octal_unsigned, decode_trimmed_ascii,
    decode_trimmed_latin1, StringEncoding,
};
pub use crate::header::{compute_checksum, TarHeader};
pub use crate::layout::{
    fields, Field, FieldDescriptor, FieldKind, HEADER_SIZE, RESERVED_LEN, RESERVED_OFFSET,
};
pub use crate::reader::HeaderReader;

#[cfg(feature = "async")]
pub use crate::async_reader::AsyncHeaderReader;

pub use filetime::FileTime;

#[cfg(feature = "async")]
mod async_reader;
mod decoder;
mod entry_type;
mod error;
mod field;
mod header;
mod layout;
mod reader;
