//! Gzip codec backed by flate2.
//!
//! # Example
//!
//! ```rust
//! use anywhere_core::Codec;
//! use anywhere_gzip::GzipCodec;
//! use std::io::Cursor;
//!
//! let codec = GzipCodec::new();
//! let mut packed = Vec::new();
//! codec.encode(&mut Cursor::new(b"hello".to_vec()), &mut packed).unwrap();
//!
//! let mut plain = Vec::new();
//! codec.decode(&mut Cursor::new(packed), &mut plain).unwrap();
//! assert_eq!(plain, b"hello");
//! ```

use std::io::{self, Read, Write};

use anywhere_core::Codec;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

/// Streaming gzip transcoder.
pub struct GzipCodec {
    level: Compression,
}

impl Default for GzipCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl GzipCodec {
    /// A codec at the default compression level.
    pub fn new() -> Self {
        Self {
            level: Compression::default(),
        }
    }

    /// A codec at an explicit compression level, 0 (store) through
    /// 9 (best).
    pub fn with_level(level: u32) -> Self {
        Self {
            level: Compression::new(level),
        }
    }
}

impl Codec for GzipCodec {
    fn name(&self) -> &str {
        "gzip"
    }

    fn extension(&self) -> &str {
        ".gz"
    }

    fn encode(&self, input: &mut dyn Read, output: &mut dyn Write) -> io::Result<u64> {
        let mut encoder = GzEncoder::new(CountingWriter::new(output), self.level);
        io::copy(input, &mut encoder)?;
        let counter = encoder.finish()?;
        Ok(counter.written)
    }

    fn decode(&self, input: &mut dyn Read, output: &mut dyn Write) -> io::Result<u64> {
        let mut decoder = GzDecoder::new(input);
        io::copy(&mut decoder, output)
    }
}

/// Tracks bytes passed through to the inner writer, so encode can report
/// the compressed size rather than the plaintext size.
struct CountingWriter<'a> {
    inner: &'a mut dyn Write,
    written: u64,
}

impl<'a> CountingWriter<'a> {
    fn new(inner: &'a mut dyn Write) -> Self {
        Self { inner, written: 0 }
    }
}

impl Write for CountingWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn encode_then_decode_restores_content() {
        let codec = GzipCodec::new();
        let original = b"line one\nline two\nline three\n".to_vec();

        let mut packed = Vec::new();
        let written = codec
            .encode(&mut Cursor::new(original.clone()), &mut packed)
            .unwrap();
        assert_eq!(written, packed.len() as u64);

        let mut plain = Vec::new();
        codec.decode(&mut Cursor::new(packed), &mut plain).unwrap();
        assert_eq!(plain, original);
    }

    #[test]
    fn output_carries_gzip_magic() {
        let mut packed = Vec::new();
        GzipCodec::new()
            .encode(&mut Cursor::new(b"x".to_vec()), &mut packed)
            .unwrap();
        assert_eq!(&packed[..2], &[0x1f, 0x8b]);
    }

    #[test]
    fn compression_shrinks_repetitive_input() {
        let input = vec![b'a'; 16 * 1024];
        let mut packed = Vec::new();
        GzipCodec::with_level(9)
            .encode(&mut Cursor::new(input.clone()), &mut packed)
            .unwrap();
        assert!(packed.len() < input.len() / 10);
    }

    #[test]
    fn decode_rejects_garbage() {
        let mut plain = Vec::new();
        let result = GzipCodec::new().decode(&mut Cursor::new(b"not gzip".to_vec()), &mut plain);
        assert!(result.is_err());
    }
}
