use std::cmp;
use std::mem;

use log::{debug, trace};

use crate::error::{Error, FieldError, Result};
use crate::field::{decode_entry_type, decode_octal_timestamp, decode_octal_unsigned, StringEncoding};
use crate::layout::{self, Field, FieldKind, HEADER_SIZE, MAX_FIELD_LEN, RESERVED_LEN};
use crate::TarHeader;

/// Where a reader stands relative to the header it is decoding.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ReaderState {
    /// Ready to start a header; the source is positioned on a block boundary.
    Idle,
    /// A header read is under way and may have taken part of the header.
    ReadingHeader,
    /// A read failed. The position of the next header is unknown and every
    /// further read fails with [`Error::Faulted`].
    Faulted,
}

/// What a call to [`HeaderDecoder::decode`] achieved.
#[derive(Debug)]
pub struct Progress {
    /// How many bytes of the input were taken. The caller must advance its
    /// source past exactly this many bytes.
    pub consumed: usize,
    /// The decoded header, once its last byte has been taken.
    pub header: Option<TarHeader>,
}

/// A header decoder that performs no I/O of its own.
///
/// The decoder is fed whatever contiguous bytes the caller's source has on
/// hand, in pieces of any size. It copies the bytes of the field it is
/// working on into a scratch buffer, decodes each field as soon as the field
/// is complete, and never takes a byte past the end of the header block, so
/// the caller can release every byte it is told was consumed.
///
/// [`HeaderReader`](crate::HeaderReader) drives this over a `BufRead`; it
/// can equally be driven by hand.
#[derive(Debug)]
pub struct HeaderDecoder {
    state: ReaderState,
    encoding: StringEncoding,
    verify_checksum: bool,

    // Index into `layout::fields()`; one past the end means the reserved
    // tail is being skipped.
    step: usize,
    scratch: [u8; MAX_FIELD_LEN],
    filled: usize,
    offset: usize,
    checksum: u64,
    partial: TarHeader,
}

impl Default for HeaderDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl HeaderDecoder {
    /// Creates an idle decoder reading ASCII text without checksum
    /// verification.
    pub fn new() -> HeaderDecoder {
        HeaderDecoder {
            state: ReaderState::Idle,
            encoding: StringEncoding::Ascii,
            verify_checksum: false,
            step: 0,
            scratch: [0; MAX_FIELD_LEN],
            filled: 0,
            offset: 0,
            checksum: 0,
            partial: TarHeader::blank(),
        }
    }

    /// Selects how text fields are decoded. Defaults to strict ASCII.
    pub fn set_string_encoding(&mut self, encoding: StringEncoding) {
        self.encoding = encoding;
    }

    /// Indicate whether the stored checksum of each header is compared
    /// against the sum of its bytes. A mismatch fails the read with
    /// [`Error::ChecksumMismatch`].
    ///
    /// This is disabled by default.
    pub fn set_verify_checksum(&mut self, verify: bool) {
        self.verify_checksum = verify;
    }

    /// Returns the current state.
    pub fn state(&self) -> ReaderState {
        self.state
    }

    /// Returns how many bytes of the current header have been taken.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Prepares for a header read.
    ///
    /// Fails if the decoder is faulted. A decoder found part-way through a
    /// header was abandoned by a read that never finished, typically a
    /// dropped future; that counts as a cancellation. One abandoned before
    /// taking any byte is still on the block boundary and starts afresh.
    pub fn begin(&mut self) -> Result<()> {
        match self.state {
            ReaderState::Idle => {
                self.state = ReaderState::ReadingHeader;
                Ok(())
            }
            ReaderState::ReadingHeader if self.taken() == 0 => Ok(()),
            ReaderState::ReadingHeader => Err(self.fail(Error::Cancelled)),
            ReaderState::Faulted => Err(Error::Faulted),
        }
    }

    /// Takes bytes from `input` towards the current header.
    ///
    /// Stops at the header boundary, so `consumed` may be less than
    /// `input.len()` only when `header` is `Some`.
    pub fn decode(&mut self, mut input: &[u8]) -> Result<Progress> {
        if self.state == ReaderState::Idle {
            self.begin()?;
        } else if self.state == ReaderState::Faulted {
            return Err(Error::Faulted);
        }

        let mut consumed = 0;
        while !input.is_empty() {
            let len = self.step_len();
            let n = cmp::min(len - self.filled, input.len());
            self.scratch[self.filled..self.filled + n].copy_from_slice(&input[..n]);
            self.filled += n;
            consumed += n;
            input = &input[n..];
            if self.filled < len {
                break;
            }

            if let Err(e) = self.finish_step() {
                return Err(self.fail(e));
            }
            if self.offset == HEADER_SIZE {
                let header = self.complete()?;
                return Ok(Progress { consumed, header: Some(header) });
            }
        }
        Ok(Progress { consumed, header: None })
    }

    /// Reports that the source has no more bytes, faulting the decoder.
    pub fn end_of_data(&mut self) -> Error {
        let read = self.taken();
        self.fail(Error::TruncatedHeader { read })
    }

    /// Reports that the read was cancelled.
    ///
    /// The decoder is faulted once part of the header has been taken. Before
    /// that it goes back to idle, since the source has not moved.
    pub fn cancel(&mut self) -> Error {
        match self.state {
            ReaderState::Faulted => Error::Faulted,
            _ if self.taken() == 0 => {
                debug!("header read cancelled before its first byte");
                self.state = ReaderState::Idle;
                Error::Cancelled
            }
            _ => self.fail(Error::Cancelled),
        }
    }

    /// Faults the decoder with `err`, discarding the partial header.
    pub(crate) fn fail(&mut self, err: Error) -> Error {
        debug!("header decoder faulted at byte {}: {}", self.taken(), err);
        self.state = ReaderState::Faulted;
        self.partial = TarHeader::blank();
        err
    }

    fn taken(&self) -> usize {
        self.offset + self.filled
    }

    fn step_len(&self) -> usize {
        match layout::fields().get(self.step) {
            Some(desc) => desc.len,
            None => RESERVED_LEN,
        }
    }

    // Decodes the field sitting complete in the scratch buffer and moves on
    // to the next one.
    fn finish_step(&mut self) -> Result<()> {
        let len = self.step_len();
        let raw = &self.scratch[..len];
        match layout::fields().get(self.step) {
            Some(desc) => {
                self.checksum += if desc.field == Field::Checksum {
                    u64::from(b' ') * len as u64
                } else {
                    raw.iter().map(|b| u64::from(*b)).sum()
                };
                store(&mut self.partial, desc.field, raw, self.encoding)
                    .map_err(|source| Error::InvalidField { field: desc.field, source })?;
                trace!("decoded `{}` field at offset {}", desc.field, desc.offset);
            }
            None => {
                self.checksum += raw.iter().map(|b| u64::from(*b)).sum::<u64>();
            }
        }
        self.step += 1;
        self.offset += len;
        self.filled = 0;
        Ok(())
    }

    fn complete(&mut self) -> Result<TarHeader> {
        let computed = mem::replace(&mut self.checksum, 0);
        if self.verify_checksum && computed != self.partial.cksum {
            let expected = self.partial.cksum;
            return Err(self.fail(Error::ChecksumMismatch { expected, computed }));
        }
        let header = mem::replace(&mut self.partial, TarHeader::blank());
        self.step = 0;
        self.offset = 0;
        self.state = ReaderState::Idle;
        debug!(
            "decoded header for `{}` ({} bytes, type {})",
            header.path(),
            header.size(),
            header.entry_type()
        );
        Ok(header)
    }
}

// Each kind has a slot for every one of its fields.
fn store(
    h: &mut TarHeader,
    field: Field,
    raw: &[u8],
    encoding: StringEncoding,
) -> std::result::Result<(), FieldError> {
    match field.kind() {
        FieldKind::Text => {
            if let Some(slot) = h.text_mut(field) {
                *slot = encoding.decode(raw)?;
            }
        }
        FieldKind::Octal => {
            if let Some(slot) = h.octal_mut(field) {
                *slot = decode_octal_unsigned(raw)?;
            }
        }
        FieldKind::Timestamp => h.mtime = decode_octal_timestamp(raw)?,
        FieldKind::TypeFlag => h.entry_type = decode_entry_type(raw)?,
    }
    Ok(())
}
