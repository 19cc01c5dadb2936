use std::io::{self, BufReader, Read};

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use ustar_stream::{
    Error, Field, FieldError, HeaderReader, ReaderState, StringEncoding, TarHeader, HEADER_SIZE,
};

macro_rules! t {
    ($e:expr) => {
        match $e {
            Ok(v) => v,
            Err(e) => panic!("{} returned {}", stringify!($e), e),
        }
    };
}

mod header;

/// A UStar header with every field set, as written by the `tar` crate.
fn ustar_block() -> [u8; HEADER_SIZE] {
    let mut h = tar::Header::new_ustar();
    t!(h.set_path("foo/bar.txt"));
    h.set_size(13);
    h.set_mode(0o644);
    h.set_uid(1000);
    h.set_gid(100);
    h.set_mtime(1_234_567_890);
    h.set_entry_type(tar::EntryType::Regular);
    t!(h.set_username("alice"));
    t!(h.set_groupname("users"));
    t!(h.set_device_major(8));
    t!(h.set_device_minor(1));
    h.set_cksum();
    *h.as_bytes()
}

/// A block filled in by hand, for layouts the `tar` crate never writes.
fn raw_block(fields: &[(Field, &[u8])]) -> [u8; HEADER_SIZE] {
    let mut block = [0u8; HEADER_SIZE];
    for &(field, bytes) in fields {
        let desc = field.descriptor();
        block[desc.offset..desc.offset + bytes.len()].copy_from_slice(bytes);
    }
    block
}

fn read_chunked(data: &[u8], chunk: usize) -> ustar_stream::Result<TarHeader> {
    HeaderReader::new(BufReader::with_capacity(chunk, data)).read_header()
}

/// Hands out a random number of bytes per read.
struct Trickle<'a> {
    data: &'a [u8],
    rng: SmallRng,
}

impl Read for Trickle<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.rng.gen_range(1..=40).min(buf.len()).min(self.data.len());
        buf[..n].copy_from_slice(&self.data[..n]);
        self.data = &self.data[n..];
        Ok(n)
    }
}

#[test]
fn reads_every_field() {
    let block = ustar_block();
    let mut reader = HeaderReader::new(&block[..]);
    let header = t!(reader.read_header());

    assert_eq!(header.name(), "foo/bar.txt");
    assert_eq!(header.mode(), "0000644");
    assert_eq!(header.owner_id(), "0001750");
    assert_eq!(header.group_id(), "0000144");
    assert_eq!(header.size(), 13);
    assert_eq!(header.mtime().unix_seconds(), 1_234_567_890);
    assert_eq!(header.cksum(), u64::from(t!(tar::Header::from_byte_slice(&block).cksum())));
    assert!(header.entry_type().is_file());
    assert_eq!(header.link_name(), "");
    assert_eq!(header.magic(), "ustar");
    assert_eq!(header.version(), "00");
    assert_eq!(header.username(), "alice");
    assert_eq!(header.groupname(), "users");
    assert_eq!(header.device_major(), "0000010");
    assert_eq!(header.device_minor(), "0000001");
    assert_eq!(header.prefix(), "");

    assert_eq!(reader.position(), HEADER_SIZE as u64);
    assert_eq!(reader.state(), ReaderState::Idle);
}

#[test]
fn chunking_does_not_matter() {
    let block = ustar_block();
    let whole = t!(read_chunked(&block, HEADER_SIZE));
    assert_eq!(t!(read_chunked(&block, 1)), whole);
    assert_eq!(t!(read_chunked(&block, 7)), whole);
    assert_eq!(t!(read_chunked(&block, 155)), whole);

    for seed in 0..20 {
        let source = Trickle { data: &block, rng: SmallRng::seed_from_u64(seed) };
        let mut reader = HeaderReader::new(BufReader::with_capacity(64, source));
        assert_eq!(t!(reader.read_header()), whole);
    }
}

#[test]
fn nul_and_space_padding() {
    let nul = raw_block(&[(Field::Size, b"0000644\0"), (Field::Checksum, b"0000644\0")]);
    let space = raw_block(&[(Field::Size, b"0000644 "), (Field::Checksum, b"0000644 ")]);
    let gnu = raw_block(&[(Field::Size, b"     644 \0"), (Field::Checksum, b"000644\0 ")]);

    for block in [nul, space, gnu] {
        let header = t!(read_chunked(&block, 512));
        assert_eq!(header.size(), 420);
        assert_eq!(header.cksum(), 420);
    }
}

#[test]
fn unset_numbers_are_zero() {
    let block = raw_block(&[(Field::Name, b"empty")]);
    let header = t!(read_chunked(&block, 512));
    assert_eq!(header.size(), 0);
    assert_eq!(header.cksum(), 0);
    assert_eq!(header.mtime().unix_seconds(), 0);
    assert_eq!(header.entry_type().as_byte(), 0);
    assert!(header.entry_type().is_file());
}

#[test]
fn one_byte_short() {
    let block = ustar_block();
    let mut reader = HeaderReader::new(BufReader::with_capacity(7, &block[..511]));
    match reader.read_header() {
        Err(Error::TruncatedHeader { read }) => assert_eq!(read, 511),
        other => panic!("unexpected result: {:?}", other),
    }
    assert_eq!(reader.state(), ReaderState::Faulted);
    assert!(matches!(reader.read_header(), Err(Error::Faulted)));
}

#[test]
fn empty_source() {
    let mut reader = HeaderReader::new(io::empty());
    assert!(matches!(reader.read_header(), Err(Error::TruncatedHeader { read: 0 })));
}

#[test]
fn malformed_size() {
    let block = raw_block(&[(Field::Name, b"bad"), (Field::Size, b"12345678abc\0")]);
    let err = read_chunked(&block, 3).unwrap_err();
    assert_eq!(err.field(), Some(Field::Size));
    match err {
        Error::InvalidField { field: Field::Size, source: FieldError::MalformedNumeric { value } } => {
            assert_eq!(value, "12345678abc")
        }
        e => panic!("unexpected error: {}", e),
    }
}

#[test]
fn failure_discards_partial_header() {
    let mut data = raw_block(&[(Field::Name, b"bad"), (Field::Mtime, b"9\0")]).to_vec();
    data.extend_from_slice(&ustar_block());

    let mut reader = HeaderReader::new(&data[..]);
    let err = reader.read_header().unwrap_err();
    assert_eq!(err.field(), Some(Field::Mtime));
    assert_eq!(reader.state(), ReaderState::Faulted);
    // The next header is intact, but the reader no longer knows where it is.
    assert!(matches!(reader.read_header(), Err(Error::Faulted)));
}

#[test]
fn non_ascii_text() {
    let block = raw_block(&[(Field::Name, b"caf\xe9.txt"), (Field::Magic, b"ustar\0")]);

    let mut reader = HeaderReader::new(&block[..]);
    match reader.read_header() {
        Err(Error::InvalidField { field: Field::Name, source: FieldError::NonAscii { byte, position } }) => {
            assert_eq!(byte, 0xe9);
            assert_eq!(position, 3);
        }
        other => panic!("unexpected result: {:?}", other),
    }

    let mut reader = HeaderReader::new(&block[..]);
    reader.set_string_encoding(StringEncoding::Latin1);
    let header = t!(reader.read_header());
    assert_eq!(header.name(), "caf\u{e9}.txt");
}

#[test]
fn checksum_verification() {
    let mut block = ustar_block();

    let mut reader = HeaderReader::new(&block[..]);
    reader.set_verify_checksum(true);
    t!(reader.read_header());

    block[265] = b'b';
    let mut reader = HeaderReader::new(&block[..]);
    assert_eq!(t!(reader.read_header()).username(), "blice");

    let mut reader = HeaderReader::new(&block[..]);
    reader.set_verify_checksum(true);
    match reader.read_header() {
        Err(Error::ChecksumMismatch { expected, computed }) => assert_eq!(computed, expected + 1),
        other => panic!("unexpected result: {:?}", other),
    }
    assert_eq!(reader.state(), ReaderState::Faulted);
}

#[test]
fn lands_on_next_header() {
    let mut ar = tar::Builder::new(Vec::new());
    let mut header = tar::Header::new_ustar();
    header.set_size(5);
    header.set_mode(0o600);
    header.set_entry_type(tar::EntryType::Regular);
    t!(ar.append_data(&mut header, "a", &b"hello"[..]));
    let mut header = tar::Header::new_ustar();
    header.set_size(0);
    header.set_mode(0o755);
    header.set_entry_type(tar::EntryType::Directory);
    t!(ar.append_data(&mut header, "b", io::empty()));
    let data = t!(ar.into_inner());

    let mut reader = HeaderReader::new(BufReader::with_capacity(100, &data[..]));
    let a = t!(reader.read_header());
    assert_eq!(a.name(), "a");
    assert_eq!(t!(a.mode_bits()), 0o600);
    assert_eq!(reader.position(), 512);

    // Skip the data block to get to the next header.
    let mut contents = [0u8; 512];
    t!(reader.get_mut().read_exact(&mut contents));
    assert_eq!(&contents[..5], b"hello");

    let b = t!(reader.read_header());
    assert_eq!(b.name(), "b");
    assert!(b.entry_type().is_dir());
    assert_eq!(t!(b.mode_bits()), 0o755);
}

/// Fails once with the given error kind, then reads from `data`.
struct Flaky<'a> {
    data: &'a [u8],
    error: Option<io::ErrorKind>,
}

impl Read for Flaky<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if let Some(kind) = self.error.take() {
            return Err(io::Error::new(kind, "flaky source"));
        }
        self.data.read(buf)
    }
}

#[test]
fn interrupted_reads_are_retried() {
    let block = ustar_block();
    let source = Flaky { data: &block, error: Some(io::ErrorKind::Interrupted) };
    let mut reader = HeaderReader::new(BufReader::new(source));
    assert_eq!(t!(reader.read_header()).name(), "foo/bar.txt");
}

#[test]
fn source_errors_fault() {
    let block = ustar_block();
    let source = Flaky { data: &block, error: Some(io::ErrorKind::BrokenPipe) };
    let mut reader = HeaderReader::new(BufReader::new(source));
    match reader.read_header() {
        Err(Error::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::BrokenPipe),
        other => panic!("unexpected result: {:?}", other),
    }
    assert!(matches!(reader.read_header(), Err(Error::Faulted)));

    let reader = reader.into_inner();
    assert_eq!(reader.get_ref().data.len(), HEADER_SIZE);
}

#[test]
fn into_io_error() {
    let err: io::Error = Error::TruncatedHeader { read: 3 }.into();
    assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    let err: io::Error = Error::Cancelled.into();
    assert_eq!(err.kind(), io::ErrorKind::Interrupted);
    let err: io::Error = Error::Faulted.into();
    assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    let err: io::Error = Error::Io(io::Error::from(io::ErrorKind::BrokenPipe)).into();
    assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
}
