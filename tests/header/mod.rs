use std::io::BufReader;

use ustar_stream::{compute_checksum, Error, Field, HeaderReader, StringEncoding, TarHeader};

use super::{raw_block, ustar_block};

fn decode(block: &[u8]) -> TarHeader {
    t!(HeaderReader::new(block).read_header())
}

#[test]
fn checksum_matches_tar() {
    let block = ustar_block();
    let stored = t!(tar::Header::from_byte_slice(&block).cksum());
    assert_eq!(compute_checksum(&block), u64::from(stored));
    assert_eq!(decode(&block).cksum(), u64::from(stored));
}

#[test]
fn numeric_accessors() {
    let header = decode(&ustar_block());
    assert_eq!(t!(header.mode_bits()), 0o644);
    assert_eq!(t!(header.uid()), 1000);
    assert_eq!(t!(header.gid()), 100);
    assert_eq!(t!(header.device_major_number().unwrap()), 8);
    assert_eq!(t!(header.device_minor_number().unwrap()), 1);
}

#[test]
fn unparsable_mode() {
    let block = raw_block(&[(Field::Mode, b"rw-r--r-"), (Field::Magic, b"ustar\0")]);
    let header = decode(&block);
    assert_eq!(header.mode(), "rw-r--r-");
    match header.mode_bits() {
        Err(Error::InvalidField { field: Field::Mode, .. }) => {}
        other => panic!("unexpected result: {:?}", other),
    }
    // Unset device numbers read as zero.
    assert_eq!(t!(header.device_major_number().unwrap()), 0);
}

#[test]
fn long_path_uses_prefix() {
    let dir = "d".repeat(120);
    let path = format!("{}/file.txt", dir);
    let mut h = tar::Header::new_ustar();
    t!(h.set_path(&path));
    h.set_cksum();

    let header = decode(h.as_bytes());
    assert_eq!(header.prefix(), dir);
    assert_eq!(header.name(), "file.txt");
    assert_eq!(header.path(), path);
}

#[test]
fn old_header() {
    let mut h = tar::Header::new_old();
    t!(h.set_path("old.txt"));
    h.set_entry_type(tar::EntryType::Regular);
    h.set_cksum();

    let header = decode(h.as_bytes());
    assert!(!header.is_ustar());
    assert_eq!(header.magic(), "");
    assert_eq!(header.path(), "old.txt");
    assert!(header.device_major_number().is_none());
    assert!(header.device_minor_number().is_none());
}

#[test]
fn prefix_ignored_without_magic() {
    let block = raw_block(&[(Field::Name, b"name"), (Field::Prefix, b"junk")]);
    let header = decode(&block);
    assert_eq!(header.prefix(), "junk");
    assert_eq!(header.path(), "name");
}

#[test]
fn gnu_header() {
    let mut h = tar::Header::new_gnu();
    t!(h.set_path("gnu.txt"));
    h.set_cksum();

    let header = decode(h.as_bytes());
    assert_eq!(header.magic(), "ustar ");
    assert_eq!(header.version(), " ");
    assert!(header.is_ustar());
}

#[test]
fn symlink() {
    let mut h = tar::Header::new_ustar();
    t!(h.set_path("link"));
    t!(h.set_link_name("target/file"));
    h.set_entry_type(tar::EntryType::Symlink);
    h.set_cksum();

    let header = decode(h.as_bytes());
    assert!(header.entry_type().is_symlink());
    assert!(!header.entry_type().is_file());
    assert_eq!(header.entry_type().as_byte(), b'2');
    assert_eq!(header.link_name(), "target/file");
}

#[test]
fn reencode() {
    let block = ustar_block();
    let header = decode(&block);
    let bytes = t!(header.to_bytes());
    assert_eq!(compute_checksum(&bytes), compute_checksum(&block));

    let mut reader = HeaderReader::new(BufReader::with_capacity(13, &bytes[..]));
    reader.set_verify_checksum(true);
    assert_eq!(t!(reader.read_header()), header);
}

#[test]
fn reencode_latin1() {
    let block = raw_block(&[(Field::OwnerName, b"j\xf6rg"), (Field::Size, b"   17 \0")]);
    let mut reader = HeaderReader::new(&block[..]);
    reader.set_string_encoding(StringEncoding::Latin1);
    let header = t!(reader.read_header());
    assert_eq!(header.username(), "j\u{f6}rg");
    assert_eq!(header.size(), 0o17);

    let bytes = t!(header.to_bytes());
    assert_eq!(&bytes[265..270], b"j\xf6rg\0");
    assert_eq!(&bytes[124..136], b"00000000017\0");

    let mut reader = HeaderReader::new(&bytes[..]);
    reader.set_string_encoding(StringEncoding::Latin1);
    assert_eq!(t!(reader.read_header()), header);
}
