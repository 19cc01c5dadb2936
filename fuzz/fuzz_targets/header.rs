#![no_main]

use std::io::BufReader;

use libfuzzer_sys::fuzz_target;
use ustar_stream::{HeaderDecoder, HeaderReader, ReaderState, StringEncoding, HEADER_SIZE};

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }
    // The first byte picks the chunk size, so splits land anywhere.
    let chunk = usize::from(data[0]) + 1;
    let data = &data[1..];

    let mut reader = HeaderReader::new(BufReader::with_capacity(chunk, data));
    reader.set_string_encoding(StringEncoding::Latin1);
    let whole = reader.read_header();
    match &whole {
        Ok(header) => {
            assert_eq!(reader.position(), HEADER_SIZE as u64);
            assert_eq!(reader.state(), ReaderState::Idle);
            // Latin-1 text always fits back into its field.
            let bytes = header.to_bytes().unwrap();
            let mut again = HeaderReader::new(&bytes[..]);
            again.set_string_encoding(StringEncoding::Latin1);
            assert_eq!(&again.read_header().unwrap(), header);
        }
        Err(_) => assert_eq!(reader.state(), ReaderState::Faulted),
    }

    // Feeding the decoder by hand must agree with the reader.
    let mut decoder = HeaderDecoder::new();
    decoder.set_string_encoding(StringEncoding::Latin1);
    let mut by_hand = None;
    for piece in data.chunks(chunk) {
        match decoder.decode(piece) {
            Ok(progress) => {
                if let Some(header) = progress.header {
                    by_hand = Some(header);
                    break;
                }
            }
            Err(_) => break,
        }
    }
    assert_eq!(by_hand.is_some(), whole.is_ok());
    if let (Some(a), Ok(b)) = (&by_hand, &whole) {
        assert_eq!(a, b);
    }
});
