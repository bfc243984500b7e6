//! Decodes encoded images into RGBA8 pixel buffers.
//!
//! Every decode produces four channels regardless of the source layout. Vertical flipping
//! is an explicit argument of each call, so one decode can never influence another.

use crate::error::{DecodeErr, ReadFileErr, ReadStreamErr, Result};
use image::imageops;
use snafu::ResultExt;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use tracing::trace;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Flip {
    #[default]
    None,
    Vertical,
}

impl From<bool> for Flip {
    fn from(flip_vertically: bool) -> Self {
        if flip_vertically {
            Flip::Vertical
        } else {
            Flip::None
        }
    }
}

/// Uncompressed, unpremultiplied RGBA8 pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

pub fn decode(bytes: &[u8], flip: Flip) -> Result<DecodedImage> {
    let mut image = image::load_from_memory(bytes)
        .context(DecodeErr)?
        .into_rgba8();

    if flip == Flip::Vertical {
        imageops::flip_vertical_in_place(&mut image);
    }

    let (width, height) = image.dimensions();
    trace!("Decoded {width}x{height} image ({} encoded bytes)", bytes.len());

    Ok(DecodedImage {
        pixels: image.into_raw(),
        width,
        height,
    })
}

pub fn decode_path(path: &Path, flip: Flip) -> Result<DecodedImage> {
    let bytes = std::fs::read(path).context(ReadFileErr { path })?;
    decode(&bytes, flip)
}

/// Reads `stream` from its current position to its end, then decodes the result.
pub fn decode_stream<R: Read + Seek>(stream: &mut R, flip: Flip) -> Result<DecodedImage> {
    let bytes = read_remaining(stream)?;
    decode(&bytes, flip)
}

fn read_remaining<R: Read + Seek>(stream: &mut R) -> Result<Vec<u8>> {
    let measure = |stream: &mut R| -> std::io::Result<u64> {
        let start = stream.stream_position()?;
        let end = stream.seek(SeekFrom::End(0))?;
        stream.seek(SeekFrom::Start(start))?;
        Ok(end.saturating_sub(start))
    };

    let expected = measure(stream).context(ReadStreamErr { expected: 0u64 })?;

    let mut bytes = vec![0u8; expected as usize];
    stream
        .read_exact(&mut bytes)
        .context(ReadStreamErr { expected })?;

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn flip_from_bool() {
        assert_eq!(Flip::from(true), Flip::Vertical);
        assert_eq!(Flip::from(false), Flip::None);
        assert_eq!(Flip::default(), Flip::None);
    }

    #[test]
    fn reads_from_current_position() {
        let mut stream = Cursor::new(b"headerPAYLOAD".to_vec());
        stream.set_position(6);

        let bytes = read_remaining(&mut stream).unwrap();
        assert_eq!(bytes, b"PAYLOAD");
    }

    #[test]
    fn rejects_garbage() {
        let err = decode(b"definitely not an image", Flip::None).unwrap_err();
        assert_eq!(err.kind(), crate::TextureErrorKind::Decode);
    }
}
