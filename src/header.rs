use std::borrow::Cow;

use filetime::FileTime;

use crate::error::{Error, FieldError, Result};
use crate::field::{self, encode_octal, encode_text};
use crate::layout::{self, Field, FieldKind, HEADER_SIZE};
use crate::EntryType;

/// The decoded metadata of one tar entry.
///
/// A `TarHeader` is produced by a reader and is a snapshot: it owns copies
/// of every field and does not change after it is returned. Text fields are
/// exposed exactly as stored, minus their NUL padding; the numeric ones the
/// format defines as octal text (`mode`, ids, device numbers) stay text, with
/// parsing accessors next to them.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TarHeader {
    pub(crate) name: String,
    pub(crate) mode: String,
    pub(crate) owner_id: String,
    pub(crate) group_id: String,
    pub(crate) size: u64,
    pub(crate) mtime: FileTime,
    pub(crate) cksum: u64,
    pub(crate) entry_type: EntryType,
    pub(crate) link_name: String,
    pub(crate) magic: String,
    pub(crate) version: String,
    pub(crate) owner_name: String,
    pub(crate) group_name: String,
    pub(crate) dev_major: String,
    pub(crate) dev_minor: String,
    pub(crate) prefix: String,
}

impl TarHeader {
    // Starting point for the decoder, which overwrites every field.
    pub(crate) fn blank() -> TarHeader {
        TarHeader {
            name: String::new(),
            mode: String::new(),
            owner_id: String::new(),
            group_id: String::new(),
            size: 0,
            mtime: FileTime::zero(),
            cksum: 0,
            entry_type: EntryType::new(0),
            link_name: String::new(),
            magic: String::new(),
            version: String::new(),
            owner_name: String::new(),
            group_name: String::new(),
            dev_major: String::new(),
            dev_minor: String::new(),
            prefix: String::new(),
        }
    }

    /// Returns the `name` field.
    ///
    /// For UStar archives this may only be the tail of the path, see
    /// [`TarHeader::path`].
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the full path of the entry, joining `prefix` and `name` when
    /// this is a UStar header with a prefix.
    pub fn path(&self) -> Cow<'_, str> {
        if !self.is_ustar() || self.prefix.is_empty() {
            Cow::Borrowed(&self.name)
        } else {
            Cow::Owned(format!("{}/{}", self.prefix, self.name))
        }
    }

    /// Returns the `mode` field as stored, e.g. `"0000644"`.
    pub fn mode(&self) -> &str {
        &self.mode
    }

    /// Parses the `mode` field into permission bits.
    pub fn mode_bits(&self) -> Result<u32> {
        parse_u32(Field::Mode, &self.mode)
    }

    /// Returns the owner's user id field as stored.
    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    /// Parses the owner's user id.
    pub fn uid(&self) -> Result<u32> {
        parse_u32(Field::OwnerId, &self.owner_id)
    }

    /// Returns the owner's group id field as stored.
    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    /// Parses the owner's group id.
    pub fn gid(&self) -> Result<u32> {
        parse_u32(Field::GroupId, &self.group_id)
    }

    /// Returns the size of the entry's data in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Returns the last modification time. It always has whole seconds.
    pub fn mtime(&self) -> FileTime {
        self.mtime
    }

    /// Returns the checksum stored in the header.
    ///
    /// Readers only compare it against the header bytes when asked to, see
    /// `HeaderReader::set_verify_checksum`.
    pub fn cksum(&self) -> u64 {
        self.cksum
    }

    /// Returns the type of entry described by this header.
    pub fn entry_type(&self) -> EntryType {
        self.entry_type
    }

    /// Returns the link target, empty for entries that are not links.
    pub fn link_name(&self) -> &str {
        &self.link_name
    }

    /// Returns the magic field: `"ustar"` for POSIX archives, `"ustar "` for
    /// GNU ones, empty for pre-POSIX ones.
    pub fn magic(&self) -> &str {
        &self.magic
    }

    /// Returns the version field.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Returns whether the magic field marks a UStar (or GNU) header, whose
    /// trailing fields are meaningful.
    pub fn is_ustar(&self) -> bool {
        self.magic.starts_with("ustar")
    }

    /// Returns the owner's user name.
    pub fn username(&self) -> &str {
        &self.owner_name
    }

    /// Returns the owner's group name.
    pub fn groupname(&self) -> &str {
        &self.group_name
    }

    /// Returns the device major number field as stored.
    pub fn device_major(&self) -> &str {
        &self.dev_major
    }

    /// Parses the device major number.
    ///
    /// `None` means this is not a UStar header, so the field does not exist.
    pub fn device_major_number(&self) -> Option<Result<u32>> {
        if self.is_ustar() {
            Some(parse_u32(Field::DevMajor, &self.dev_major))
        } else {
            None
        }
    }

    /// Returns the device minor number field as stored.
    pub fn device_minor(&self) -> &str {
        &self.dev_minor
    }

    /// Parses the device minor number.
    ///
    /// `None` means this is not a UStar header, so the field does not exist.
    pub fn device_minor_number(&self) -> Option<Result<u32>> {
        if self.is_ustar() {
            Some(parse_u32(Field::DevMinor, &self.dev_minor))
        } else {
            None
        }
    }

    /// Returns the path prefix field.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns the value of a text field, `None` for fields of other kinds.
    fn text(&self, field: Field) -> Option<&str> {
        let text = match field {
            Field::Name => &self.name,
            Field::Mode => &self.mode,
            Field::OwnerId => &self.owner_id,
            Field::GroupId => &self.group_id,
            Field::LinkName => &self.link_name,
            Field::Magic => &self.magic,
            Field::Version => &self.version,
            Field::OwnerName => &self.owner_name,
            Field::GroupName => &self.group_name,
            Field::DevMajor => &self.dev_major,
            Field::DevMinor => &self.dev_minor,
            Field::Prefix => &self.prefix,
            _ => return None,
        };
        Some(text)
    }

    pub(crate) fn text_mut(&mut self, field: Field) -> Option<&mut String> {
        let text = match field {
            Field::Name => &mut self.name,
            Field::Mode => &mut self.mode,
            Field::OwnerId => &mut self.owner_id,
            Field::GroupId => &mut self.group_id,
            Field::LinkName => &mut self.link_name,
            Field::Magic => &mut self.magic,
            Field::Version => &mut self.version,
            Field::OwnerName => &mut self.owner_name,
            Field::GroupName => &mut self.group_name,
            Field::DevMajor => &mut self.dev_major,
            Field::DevMinor => &mut self.dev_minor,
            Field::Prefix => &mut self.prefix,
            _ => return None,
        };
        Some(text)
    }

    pub(crate) fn octal_mut(&mut self, field: Field) -> Option<&mut u64> {
        match field {
            Field::Size => Some(&mut self.size),
            Field::Checksum => Some(&mut self.cksum),
            _ => None,
        }
    }

    /// Encodes this header back into a 512-byte block.
    ///
    /// Numeric fields are written as zero-padded octal and the stored
    /// checksum is written as-is, so decoding the block yields a header equal
    /// to this one. Fails if a field does not fit its slot.
    pub fn to_bytes(&self) -> Result<[u8; HEADER_SIZE]> {
        let mut block = [0u8; HEADER_SIZE];
        for desc in layout::fields() {
            let dst = &mut block[desc.range()];
            let res = match desc.field.kind() {
                FieldKind::Text => encode_text(dst, self.text(desc.field).unwrap_or_default()),
                FieldKind::Octal if desc.field == Field::Checksum => encode_cksum(dst, self.cksum),
                FieldKind::Octal => encode_octal(dst, self.size),
                // Decoded timestamps are never negative.
                FieldKind::Timestamp => {
                    encode_octal(dst, u64::try_from(self.mtime.unix_seconds()).unwrap_or(0))
                }
                FieldKind::TypeFlag => {
                    dst[0] = self.entry_type.as_byte();
                    Ok(())
                }
            };
            res.map_err(|source| Error::InvalidField { field: desc.field, source })?;
        }
        Ok(block)
    }
}

/// Computes the checksum of a header block: the unsigned sum of its bytes,
/// with the checksum field itself counted as eight spaces.
pub fn compute_checksum(block: &[u8; HEADER_SIZE]) -> u64 {
    let cksum = Field::Checksum.descriptor().range();
    block
        .iter()
        .enumerate()
        .map(|(i, b)| if cksum.contains(&i) { u64::from(b' ') } else { u64::from(*b) })
        .sum()
}

// Six digits, a NUL and a space, the way tar has always written it.
fn encode_cksum(dst: &mut [u8], cksum: u64) -> std::result::Result<(), FieldError> {
    if encode_octal(&mut dst[..7], cksum).is_ok() {
        dst[7] = b' ';
        Ok(())
    } else {
        encode_octal(dst, cksum)
    }
}

fn parse_u32(field: Field, text: &str) -> Result<u32> {
    field::decode_octal_unsigned(text.as_bytes())
        .and_then(|n| {
            u32::try_from(n).map_err(|_| FieldError::MalformedNumeric { value: text.to_string() })
        })
        .map_err(|source| Error::InvalidField { field, source })
}
