//! Lists the entries of a tar archive, optionally gzip-compressed, by
//! reading each header and skipping over the entry's data.
//!
//!     cargo run --example read_header -- foo.tar.gz

use std::env;
use std::error::Error;

use async_compression::tokio::bufread::GzipDecoder;
use tokio::fs::File;
use tokio::io::{self, AsyncBufRead, AsyncReadExt, BufReader};
use ustar_stream::AsyncHeaderReader;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    let path = env::args().nth(1).ok_or("usage: read_header <archive.tar[.gz]>")?;
    let file = BufReader::new(File::open(&path).await?);
    let source: Box<dyn AsyncBufRead + Unpin> = if path.ends_with(".gz") {
        Box::new(BufReader::new(GzipDecoder::new(file)))
    } else {
        Box::new(file)
    };

    let mut reader = AsyncHeaderReader::new(source);
    loop {
        let header = reader.read_header().await?;
        // Archives end with zeroed blocks.
        if header.cksum() == 0 && header.name().is_empty() {
            break;
        }
        println!(
            "{} {:>10} {:>12} {}",
            header.entry_type(),
            header.size(),
            header.mtime().unix_seconds(),
            header.path()
        );

        let padded = header.size().div_ceil(512) * 512;
        let mut data = reader.get_mut().take(padded);
        io::copy(&mut data, &mut io::sink()).await?;
    }
    Ok(())
}
