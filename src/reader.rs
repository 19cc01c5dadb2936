use std::io::{self, BufRead};

use crate::decoder::{HeaderDecoder, ReaderState};
use crate::error::{Error, Result};
use crate::field::StringEncoding;
use crate::TarHeader;

/// Reads tar headers from a buffered byte source.
///
/// The source only has to hand out whatever bytes it currently holds
/// (`fill_buf`) and be told how many were used (`consume`); a header may
/// arrive in pieces of any size, including one byte at a time. Only the
/// bytes of the field being decoded are copied, never the whole header.
///
/// Each call to [`read_header`](HeaderReader::read_header) consumes exactly
/// one 512-byte block, leaving the source at the start of whatever follows
/// the header. Any failure faults the reader for good.
///
/// # Examples
///
/// ```no_run
/// use std::fs::File;
/// use std::io::BufReader;
/// use ustar_stream::HeaderReader;
///
/// let file = File::open("foo.tar").unwrap();
/// let mut reader = HeaderReader::new(BufReader::new(file));
/// let header = reader.read_header().unwrap();
/// println!("{} ({} bytes)", header.path(), header.size());
/// ```
#[derive(Debug)]
pub struct HeaderReader<R> {
    inner: R,
    decoder: HeaderDecoder,
    pos: u64,
}

impl<R: BufRead> HeaderReader<R> {
    /// Create a new reader over `inner`, positioned at the start of a header.
    pub fn new(inner: R) -> HeaderReader<R> {
        HeaderReader { inner, decoder: HeaderDecoder::new(), pos: 0 }
    }

    /// Reads the next header.
    ///
    /// Fails with [`Error::TruncatedHeader`] if the source ends before 512
    /// bytes are read, including when it is already exhausted.
    pub fn read_header(&mut self) -> Result<TarHeader> {
        self.decoder.begin()?;
        loop {
            let available = match self.inner.fill_buf() {
                Ok(buf) => buf,
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(self.decoder.fail(Error::Io(e))),
            };
            if available.is_empty() {
                return Err(self.decoder.end_of_data());
            }
            let progress = self.decoder.decode(available)?;
            self.inner.consume(progress.consumed);
            self.pos += progress.consumed as u64;
            if let Some(header) = progress.header {
                return Ok(header);
            }
        }
    }
}

impl<R> HeaderReader<R> {
    /// Indicate whether each header's stored checksum is verified against
    /// its bytes.
    ///
    /// This is disabled by default.
    pub fn set_verify_checksum(&mut self, verify: bool) {
        self.decoder.set_verify_checksum(verify);
    }

    /// Selects how text fields are decoded. Defaults to strict ASCII.
    pub fn set_string_encoding(&mut self, encoding: StringEncoding) {
        self.decoder.set_string_encoding(encoding);
    }

    /// Returns the current state of the reader.
    pub fn state(&self) -> ReaderState {
        self.decoder.state()
    }

    /// Returns how many bytes this reader has consumed from the source.
    pub fn position(&self) -> u64 {
        self.pos
    }

    /// Returns a reference to the underlying source.
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Returns a mutable reference to the underlying source.
    ///
    /// Reading from it moves the position of the next header.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    /// Unwrap this reader, returning the underlying source.
    pub fn into_inner(self) -> R {
        self.inner
    }
}
