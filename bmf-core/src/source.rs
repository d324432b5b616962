use anyhow::{Context, Result};
use memmap2::Mmap;
use std::fs::File;
use std::io::Cursor;
use std::path::Path;

use crate::body::DecodeLimits;
use crate::manifest::Manifest;

/// Location of the delta that upgrades `old_build_id` to `new_build_id`.
pub fn delta_url(base_url: &str, new_build_id: &str, old_build_id: &str) -> String {
    format!("{}/Deltas/{}/{}.delta", base_url.trim_end_matches('/'), new_build_id, old_build_id)
}

pub fn read_manifest_file(path: &Path) -> Result<Manifest> {
    read_manifest_file_with_limits(path, &DecodeLimits::default())
}

/// Memory-map `path` and decode it.
pub fn read_manifest_file_with_limits(path: &Path, limits: &DecodeLimits) -> Result<Manifest> {
    let f = File::open(path).with_context(|| format!("open {:?}", path))?;
    if f.metadata()?.len() == 0 {
        // Empty files cannot be mapped on every platform.
        return Manifest::decode_with_limits(Cursor::new(Vec::<u8>::new()), limits)
            .with_context(|| format!("decode {:?}", path));
    }
    // SAFETY: read-only mapping; the file is not expected to change while decoding.
    let map = unsafe { Mmap::map(&f) }.with_context(|| format!("mmap {:?}", path))?;
    Manifest::decode_with_limits(Cursor::new(&map[..]), limits)
        .with_context(|| format!("decode {:?}", path))
}

/// Raw bytes of a manifest or delta file.
pub fn load_file_bytes(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("read {:?}", path))
}
