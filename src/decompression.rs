//! Transparent decompression of compressed log files
//!
//! Compression is detected from magic bytes, not from the file name, so a
//! rotated `app.log.1` that happens to be gzipped is still read correctly.

use flate2::read::MultiGzDecoder;
use std::io::{self, Chain, Cursor, Read};

const GZIP_MAGIC: [u8; 3] = [0x1F, 0x8B, 0x08];
const ZSTD_MAGIC: [u8; 4] = [0x28, 0xB5, 0x2F, 0xFD];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    Gzip,
    Zstd,
    None,
}

impl Compression {
    pub fn detect(head: &[u8]) -> Self {
        if head.starts_with(&GZIP_MAGIC) {
            Compression::Gzip
        } else if head.starts_with(&ZSTD_MAGIC) {
            Compression::Zstd
        } else {
            Compression::None
        }
    }
}

/// Read up to four bytes without losing them for the caller.
fn peek_head<R: Read>(mut reader: R) -> io::Result<([u8; 4], usize, R)> {
    let mut head = [0u8; 4];
    let mut filled = 0;
    // A single read may return fewer bytes than available (pipes, stdin).
    while filled < head.len() {
        match reader.read(&mut head[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok((head, filled, reader))
}

/// Wrap `reader` in a decoder matching its magic bytes.
pub fn maybe_decompress<R: Read + Send + 'static>(
    reader: R,
) -> io::Result<(Box<dyn Read + Send>, Compression)> {
    let (head, filled, reader) = peek_head(reader)?;
    let compression = Compression::detect(&head[..filled]);

    // Put the peeked bytes back in front of the stream.
    let chained: Chain<Cursor<Vec<u8>>, R> = Cursor::new(head[..filled].to_vec()).chain(reader);

    let decoded: Box<dyn Read + Send> = match compression {
        Compression::Gzip => Box::new(MultiGzDecoder::new(chained)),
        Compression::Zstd => Box::new(zstd::Decoder::new(chained)?),
        Compression::None => Box::new(chained),
    };
    Ok((decoded, compression))
}
