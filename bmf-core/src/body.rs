use flate2::read::ZlibDecoder;
use std::io::{Cursor, Read, Seek};

use crate::error::{ManifestError, Result};
use crate::header::Header;
use crate::reader::BinReader;

#[derive(Clone, Copy, Debug)]
pub struct DecodeLimits {
    /// Ceiling on the inflated body, checked before the header's size.
    pub max_uncompressed_bytes: usize,
    /// Ceiling on any element count read from the stream.
    pub max_entries: usize,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self { max_uncompressed_bytes: 256 * 1024 * 1024, max_entries: 5_000_000 }
    }
}

/// Refuse encrypted bodies, then inflate a compressed one into memory.
///
/// Returns `None` when the body is stored raw and block decoding should
/// continue over the original stream (already positioned at the body).
pub fn open_body<R: Read + Seek>(
    r: &mut BinReader<R>,
    header: &Header,
    limits: &DecodeLimits,
) -> Result<Option<Cursor<Vec<u8>>>> {
    if header.is_encrypted() {
        return Err(ManifestError::UnsupportedEncryption);
    }
    if !header.is_compressed() {
        return Ok(None);
    }
    let data = inflate(r.get_mut(), limits.max_uncompressed_bytes)?;
    let expected = header.data_size_uncompressed as u64;
    if data.len() as u64 != expected {
        return Err(ManifestError::SizeMismatch { expected, actual: data.len() as u64 });
    }
    log::debug!(
        "inflated body: {} -> {} bytes",
        header.data_size_compressed,
        data.len()
    );
    Ok(Some(Cursor::new(data)))
}

/// Inflate a zlib stream covering the rest of `src`, reading at most one
/// byte past `max` so an oversized body is detected without buffering it.
pub fn inflate<R: Read>(src: R, max: usize) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    ZlibDecoder::new(src)
        .take((max as u64).saturating_add(1))
        .read_to_end(&mut out)
        .map_err(ManifestError::Decompression)?;
    if out.len() > max {
        return Err(ManifestError::LimitExceeded {
            what: "uncompressed body",
            value: out.len() as u64,
            limit: max as u64,
        });
    }
    Ok(out)
}
