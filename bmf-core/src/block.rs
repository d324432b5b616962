use serde::Serialize;
use std::io::{Read, Seek, SeekFrom};

use crate::error::Result;
use crate::reader::BinReader;

/// Upper bound on capacity reserved from an untrusted count.
pub(crate) const PREALLOC: usize = 4096;

/// Common prefix of every body block.
#[derive(Serialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BlockInfo {
    /// Length of the whole block from its first byte, this field included.
    pub data_size: u32,
    pub data_version: u8,
}

impl BlockInfo {
    pub fn read<R: Read + Seek>(r: &mut BinReader<R>) -> Result<Self> {
        let data_size = r.read_u32()?;
        let data_version = r.read_u8()?;
        Ok(Self { data_size, data_version })
    }
}

/// A size-prefixed body block.
pub trait Block: Sized {
    const NAME: &'static str;

    /// Decode the block starting at the current position. May stop short of
    /// the declared size; the caller skips the rest.
    fn read_from<R: Read + Seek>(r: &mut BinReader<R>) -> Result<Self>;

    fn info(&self) -> BlockInfo;
}

/// Decode one block and leave the cursor at `block_start + data_size`,
/// regardless of how much the decoder consumed.
pub fn decode_block<B: Block, R: Read + Seek>(r: &mut BinReader<R>) -> Result<B> {
    let start = r.position()?;
    let block = B::read_from(r)?;
    let info = block.info();
    let consumed = r.position()?.saturating_sub(start);
    if consumed < info.data_size as u64 {
        log::debug!(
            "{}: v{} skipping {} trailing bytes",
            B::NAME,
            info.data_version,
            info.data_size as u64 - consumed
        );
    }
    r.seek(SeekFrom::Start(start + info.data_size as u64))?;
    Ok(block)
}
