// See https://en.wikipedia.org/wiki/Tar_%28computing%29#UStar_format
use std::fmt;
use std::ops::Range;

/// Size of a header block, and of every block in a tar archive.
pub const HEADER_SIZE: usize = 512;

/// Offset of the reserved bytes following the last UStar field.
pub const RESERVED_OFFSET: usize = 500;

/// Number of reserved bytes at the end of a header block. They are consumed
/// but never decoded.
pub const RESERVED_LEN: usize = 12;

/// Length of the longest field, `prefix`.
pub(crate) const MAX_FIELD_LEN: usize = 155;

/// A logical field of a UStar header block.
///
/// Variants are declared in offset order, which is also the order in which
/// the decoder populates them.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Field {
    /// Entry path, or its last components when `Prefix` is used.
    Name,
    /// Permission bits as octal digits.
    Mode,
    /// Owner user id as octal digits.
    OwnerId,
    /// Owner group id as octal digits.
    GroupId,
    /// Size of the entry's data in bytes.
    Size,
    /// Last modification time in seconds since the Unix epoch.
    Mtime,
    /// Header checksum.
    Checksum,
    /// Type of entry.
    TypeFlag,
    /// Target of a hard or symbolic link.
    LinkName,
    /// The `ustar` marker.
    Magic,
    /// UStar version.
    Version,
    /// Owner user name.
    OwnerName,
    /// Owner group name.
    GroupName,
    /// Device major number.
    DevMajor,
    /// Device minor number.
    DevMinor,
    /// Leading path components for names longer than the `name` field.
    Prefix,
}

/// How the bytes of a field are decoded.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum FieldKind {
    /// NUL-padded text.
    Text,
    /// Octal ASCII digits holding an unsigned integer.
    Octal,
    /// Octal ASCII seconds since the Unix epoch.
    Timestamp,
    /// The single type-flag byte.
    TypeFlag,
}

/// Position and length of a field within the 512-byte header block.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct FieldDescriptor {
    /// Which field this is.
    pub field: Field,
    /// Byte offset from the start of the block.
    pub offset: usize,
    /// Length in bytes.
    pub len: usize,
}

const FIELDS: [FieldDescriptor; 16] = [
    FieldDescriptor { field: Field::Name, offset: 0, len: 100 },
    FieldDescriptor { field: Field::Mode, offset: 100, len: 8 },
    FieldDescriptor { field: Field::OwnerId, offset: 108, len: 8 },
    FieldDescriptor { field: Field::GroupId, offset: 116, len: 8 },
    FieldDescriptor { field: Field::Size, offset: 124, len: 12 },
    FieldDescriptor { field: Field::Mtime, offset: 136, len: 12 },
    FieldDescriptor { field: Field::Checksum, offset: 148, len: 8 },
    FieldDescriptor { field: Field::TypeFlag, offset: 156, len: 1 },
    FieldDescriptor { field: Field::LinkName, offset: 157, len: 100 },
    // UStar format
    FieldDescriptor { field: Field::Magic, offset: 257, len: 6 },
    FieldDescriptor { field: Field::Version, offset: 263, len: 2 },
    FieldDescriptor { field: Field::OwnerName, offset: 265, len: 32 },
    FieldDescriptor { field: Field::GroupName, offset: 297, len: 32 },
    FieldDescriptor { field: Field::DevMajor, offset: 329, len: 8 },
    FieldDescriptor { field: Field::DevMinor, offset: 337, len: 8 },
    FieldDescriptor { field: Field::Prefix, offset: 345, len: 155 },
];

/// Returns the fields of a header block in canonical offset order.
///
/// The fields are contiguous: each one starts where the previous one ends,
/// and the last one ends at [`RESERVED_OFFSET`].
pub fn fields() -> &'static [FieldDescriptor] {
    &FIELDS
}

impl Field {
    /// Returns where this field lives in the header block.
    pub fn descriptor(self) -> FieldDescriptor {
        FIELDS[self as usize]
    }

    /// Returns how this field is decoded.
    ///
    /// `mode`, the ids and the device numbers are octal on disk but are kept
    /// as text, see [`TarHeader::mode`](crate::TarHeader::mode).
    pub fn kind(self) -> FieldKind {
        match self {
            Field::Size | Field::Checksum => FieldKind::Octal,
            Field::Mtime => FieldKind::Timestamp,
            Field::TypeFlag => FieldKind::TypeFlag,
            _ => FieldKind::Text,
        }
    }

    /// Returns the conventional name of this field.
    pub fn name(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Mode => "mode",
            Field::OwnerId => "uid",
            Field::GroupId => "gid",
            Field::Size => "size",
            Field::Mtime => "mtime",
            Field::Checksum => "chksum",
            Field::TypeFlag => "typeflag",
            Field::LinkName => "linkname",
            Field::Magic => "magic",
            Field::Version => "version",
            Field::OwnerName => "uname",
            Field::GroupName => "gname",
            Field::DevMajor => "devmajor",
            Field::DevMinor => "devminor",
            Field::Prefix => "prefix",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FieldDescriptor {
    /// Returns the byte range of this field within the header block.
    pub fn range(&self) -> Range<usize> {
        self.offset..self.offset + self.len
    }
}
