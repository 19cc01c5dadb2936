use std::future::Future;
use std::io;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::decoder::{HeaderDecoder, ReaderState};
use crate::error::{Error, Result};
use crate::field::StringEncoding;
use crate::TarHeader;

/// Reads tar headers from an asynchronous buffered byte source.
///
/// This is the asynchronous counterpart of
/// [`HeaderReader`](crate::HeaderReader): waiting for the source is the only
/// point where a read suspends. Cancellation is cooperative, either through
/// [`read_header_or_cancel`](AsyncHeaderReader::read_header_or_cancel) or by
/// dropping a pending [`read_header`](AsyncHeaderReader::read_header)
/// future. Either way the reader is faulted afterwards if part of the header
/// had already been consumed; otherwise it can go on to read the header.
///
/// # Examples
///
/// ```no_run
/// # async fn run() -> ustar_stream::Result<()> {
/// use tokio::fs::File;
/// use tokio::io::BufReader;
/// use ustar_stream::AsyncHeaderReader;
///
/// let file = File::open("foo.tar").await?;
/// let mut reader = AsyncHeaderReader::new(BufReader::new(file));
/// let header = reader.read_header().await?;
/// println!("{} ({} bytes)", header.path(), header.size());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct AsyncHeaderReader<R> {
    inner: R,
    decoder: HeaderDecoder,
    pos: u64,
}

impl<R: AsyncBufRead + Unpin> AsyncHeaderReader<R> {
    /// Create a new reader over `inner`, positioned at the start of a header.
    pub fn new(inner: R) -> AsyncHeaderReader<R> {
        AsyncHeaderReader { inner, decoder: HeaderDecoder::new(), pos: 0 }
    }

    /// Reads the next header.
    ///
    /// If the returned future is dropped after taking part of the header,
    /// the next call fails with [`Error::Cancelled`].
    pub async fn read_header(&mut self) -> Result<TarHeader> {
        self.decoder.begin()?;
        loop {
            let available = match self.inner.fill_buf().await {
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

    /// Reads the next header unless `cancel` completes first, in which case
    /// the read is abandoned and fails with [`Error::Cancelled`].
    ///
    /// `cancel` is polled before the read, so one that is already complete
    /// wins without touching the source, and the reader stays idle.
    pub async fn read_header_or_cancel<C>(&mut self, cancel: C) -> Result<TarHeader>
    where
        C: Future<Output = ()>,
    {
        let outcome = tokio::select! {
            biased;
            () = cancel => None,
            res = self.read_header() => Some(res),
        };
        match outcome {
            Some(res) => res,
            None => Err(self.decoder.cancel()),
        }
    }
}

impl<R> AsyncHeaderReader<R> {
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
