//! Decoding of the raw bytes of individual header fields.
//!
//! Text fields are NUL padded. Numeric fields hold octal ASCII digits which
//! archivers pad with leading zeros or spaces and terminate with a NUL, a
//! space, or both (GNU tar writes the checksum as `"012345\0 "`). Every
//! function here is pure and works on any byte slice, not only on slices of
//! the standard field lengths.

use std::iter;

use filetime::FileTime;

use crate::error::FieldError;
use crate::EntryType;

// FileTime counts from 1601 on Windows, which takes this much off the top
// of the i64 range for Unix seconds.
const MAX_UNIX_SECONDS: i64 = i64::MAX - 11_644_473_600;

/// How text fields are turned into strings.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum StringEncoding {
    /// Strict 7-bit ASCII, as the UStar format prescribes.
    #[default]
    Ascii,
    /// Every byte maps to the code point of the same value. Never fails,
    /// which suits archives written by non-conforming tools.
    Latin1,
}

impl StringEncoding {
    /// Decodes a text field with this encoding.
    pub fn decode(self, bytes: &[u8]) -> Result<String, FieldError> {
        match self {
            StringEncoding::Ascii => decode_trimmed_ascii(bytes),
            StringEncoding::Latin1 => Ok(decode_trimmed_latin1(bytes)),
        }
    }
}

/// Decodes a text field as ASCII, dropping its trailing NUL bytes.
///
/// Fails on the first byte outside of 7-bit ASCII.
pub fn decode_trimmed_ascii(bytes: &[u8]) -> Result<String, FieldError> {
    let bytes = trim_nul(bytes);
    if let Some(position) = bytes.iter().position(|b| !b.is_ascii()) {
        return Err(FieldError::NonAscii { byte: bytes[position], position });
    }
    Ok(bytes.iter().map(|&b| char::from(b)).collect())
}

/// Decodes a text field as Latin-1, dropping its trailing NUL bytes.
pub fn decode_trimmed_latin1(bytes: &[u8]) -> String {
    trim_nul(bytes).iter().map(|&b| char::from(b)).collect()
}

/// Decodes an octal ASCII number.
///
/// Trailing NULs and whitespace, and leading whitespace, are ignored. A
/// field made only of NUL bytes was never set and decodes as zero; anything
/// else must leave at least one octal digit after trimming.
pub fn decode_octal_unsigned(bytes: &[u8]) -> Result<u64, FieldError> {
    if bytes.iter().all(|b| *b == 0) {
        return Ok(0);
    }
    let digits = trim_numeric(bytes);
    let malformed = || FieldError::MalformedNumeric {
        value: String::from_utf8_lossy(digits).into_owned(),
    };
    if digits.is_empty() {
        return Err(malformed());
    }
    digits
        .iter()
        .try_fold(0u64, |acc, &b| {
            if !(b'0'..=b'7').contains(&b) {
                return None;
            }
            acc.checked_mul(8)?.checked_add(u64::from(b - b'0'))
        })
        .ok_or_else(malformed)
}

/// Decodes an octal ASCII count of seconds since 1970-01-01T00:00:00Z.
pub fn decode_octal_timestamp(bytes: &[u8]) -> Result<FileTime, FieldError> {
    let seconds = decode_octal_unsigned(bytes)?;
    match i64::try_from(seconds) {
        Ok(secs) if secs <= MAX_UNIX_SECONDS => Ok(FileTime::from_unix_time(secs, 0)),
        _ => Err(FieldError::TimestampOutOfRange { seconds }),
    }
}

/// Decodes the one-byte type flag. An empty slice reads as a NUL flag.
pub fn decode_entry_type(bytes: &[u8]) -> Result<EntryType, FieldError> {
    let byte = bytes.first().copied().unwrap_or(0);
    if !byte.is_ascii() {
        return Err(FieldError::NonAscii { byte, position: 0 });
    }
    Ok(EntryType::new(byte))
}

/// Writes `value` into a text field, NUL padding the remainder.
pub(crate) fn encode_text(dst: &mut [u8], value: &str) -> Result<(), FieldError> {
    let len = value.chars().count();
    if len > dst.len() {
        return Err(FieldError::Overflow { len, capacity: dst.len() });
    }
    dst.fill(0);
    for (slot, c) in dst.iter_mut().zip(value.chars()) {
        *slot = u8::try_from(c).map_err(|_| FieldError::Unrepresentable(c))?;
    }
    Ok(())
}

/// Writes `value` as zero-padded octal digits followed by a NUL, or as
/// digits filling the whole field when the terminator does not fit.
pub(crate) fn encode_octal(dst: &mut [u8], value: u64) -> Result<(), FieldError> {
    let digits = format!("{:o}", value);
    let capacity = dst.len();
    if digits.len() > capacity {
        return Err(FieldError::Overflow { len: digits.len(), capacity });
    }
    let width = if digits.len() < capacity { capacity - 1 } else { capacity };
    dst.fill(0);
    let value = digits.bytes().rev().chain(iter::repeat(b'0'));
    for (slot, value) in dst[..width].iter_mut().rev().zip(value) {
        *slot = value;
    }
    Ok(())
}

fn trim_nul(bytes: &[u8]) -> &[u8] {
    match bytes.iter().rposition(|b| *b != 0) {
        Some(i) => &bytes[..=i],
        None => &[],
    }
}

fn trim_numeric(bytes: &[u8]) -> &[u8] {
    let end = bytes
        .iter()
        .rposition(|b| *b != 0 && !b.is_ascii_whitespace())
        .map_or(0, |i| i + 1);
    let bytes = &bytes[..end];
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    &bytes[start..]
}
