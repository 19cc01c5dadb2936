use std::fmt;

/// The `typeflag` byte of a header, saying what kind of entry it describes.
///
/// Any ASCII byte is accepted; archivers define flags beyond the ones named
/// here, and this type keeps them as-is rather than guessing.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct EntryType {
    byte: u8,
}

impl EntryType {
    /// Wraps a raw type-flag byte.
    pub fn new(byte: u8) -> EntryType {
        EntryType { byte }
    }

    /// A regular file.
    pub fn file() -> EntryType {
        EntryType::new(b'0')
    }

    /// A hard link.
    pub fn hard_link() -> EntryType {
        EntryType::new(b'1')
    }

    /// A symbolic link.
    pub fn symlink() -> EntryType {
        EntryType::new(b'2')
    }

    /// A directory.
    pub fn dir() -> EntryType {
        EntryType::new(b'5')
    }

    /// Returns whether this is a regular file.
    ///
    /// Pre-POSIX archives write a NUL type flag for regular files.
    pub fn is_file(&self) -> bool {
        self.byte == 0 || self.byte == b'0'
    }

    /// Returns whether this is a hard link.
    pub fn is_hard_link(&self) -> bool {
        self.byte == b'1'
    }

    /// Returns whether this is a symbolic link.
    pub fn is_symlink(&self) -> bool {
        self.byte == b'2'
    }

    /// Returns whether this is a character device.
    pub fn is_character_special(&self) -> bool {
        self.byte == b'3'
    }

    /// Returns whether this is a block device.
    pub fn is_block_special(&self) -> bool {
        self.byte == b'4'
    }

    /// Returns whether this is a directory.
    pub fn is_dir(&self) -> bool {
        self.byte == b'5'
    }

    /// Returns whether this is a FIFO.
    pub fn is_fifo(&self) -> bool {
        self.byte == b'6'
    }

    /// Returns whether this is a contiguous file.
    pub fn is_contiguous(&self) -> bool {
        self.byte == b'7'
    }

    /// Returns whether the entry's data holds pax records for the next entry.
    pub fn is_pax_local_extensions(&self) -> bool {
        self.byte == b'x'
    }

    /// Returns whether the entry's data holds pax records for the rest of
    /// the archive.
    pub fn is_pax_global_extensions(&self) -> bool {
        self.byte == b'g'
    }

    /// Returns whether the entry's data is the GNU long name of the next
    /// entry.
    pub fn is_gnu_longname(&self) -> bool {
        self.byte == b'L'
    }

    /// Returns whether the entry's data is the GNU long link target of the
    /// next entry.
    pub fn is_gnu_longlink(&self) -> bool {
        self.byte == b'K'
    }

    /// Returns the raw type-flag byte.
    pub fn as_byte(&self) -> u8 {
        self.byte
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.byte == 0 {
            f.write_str("\\0")
        } else {
            write!(f, "{}", self.byte as char)
        }
    }
}
