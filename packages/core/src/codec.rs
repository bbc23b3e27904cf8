//! Codec seam for format transcoding.

use std::io::{Read, Write};

/// A format transcoder invoked by a file resource to produce a
/// differently-encoded sibling.
///
/// Codecs are external collaborators: the core knows nothing about
/// concrete formats and streams opaque bytes through them. Errors are
/// plain `io::Error`s; the resource layer maps them onto its taxonomy
/// with the URL attached.
///
/// # Object Safety
///
/// This trait is object-safe: you can use `&dyn Codec` / `Box<dyn Codec>`.
pub trait Codec: Send + Sync {
    /// Short codec name, for logs and diagnostics.
    fn name(&self) -> &str;

    /// Filename extension for encoded siblings, including the dot
    /// (e.g. `.gz`).
    fn extension(&self) -> &str;

    /// Stream `input` through the encoder into `output`, returning the
    /// number of bytes written.
    fn encode(&self, input: &mut dyn Read, output: &mut dyn Write) -> std::io::Result<u64>;

    /// Stream `input` through the decoder into `output`, returning the
    /// number of bytes written.
    fn decode(&self, input: &mut dyn Read, output: &mut dyn Write) -> std::io::Result<u64>;
}

impl<T: Codec + ?Sized> Codec for Box<T> {
    fn name(&self) -> &str {
        self.as_ref().name()
    }

    fn extension(&self) -> &str {
        self.as_ref().extension()
    }

    fn encode(&self, input: &mut dyn Read, output: &mut dyn Write) -> std::io::Result<u64> {
        self.as_ref().encode(input, output)
    }

    fn decode(&self, input: &mut dyn Read, output: &mut dyn Write) -> std::io::Result<u64> {
        self.as_ref().decode(input, output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Codec that reverses each byte buffer, useful as the simplest
    /// possible involution.
    struct ReverseCodec;

    impl Codec for ReverseCodec {
        fn name(&self) -> &str {
            "reverse"
        }

        fn extension(&self) -> &str {
            ".rev"
        }

        fn encode(&self, input: &mut dyn Read, output: &mut dyn Write) -> std::io::Result<u64> {
            let mut data = Vec::new();
            input.read_to_end(&mut data)?;
            data.reverse();
            output.write_all(&data)?;
            Ok(data.len() as u64)
        }

        fn decode(&self, input: &mut dyn Read, output: &mut dyn Write) -> std::io::Result<u64> {
            self.encode(input, output)
        }
    }

    #[test]
    fn boxed_codec_forwards() {
        let codec: Box<dyn Codec> = Box::new(ReverseCodec);
        assert_eq!(codec.name(), "reverse");
        assert_eq!(codec.extension(), ".rev");

        let mut output = Vec::new();
        let written = codec
            .encode(&mut std::io::Cursor::new(b"abc".to_vec()), &mut output)
            .unwrap();
        assert_eq!(written, 3);
        assert_eq!(output, b"cba");
    }
}
