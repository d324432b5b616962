use bitflags::bitflags;
use serde::Serialize;
use std::io::{Read, Seek};

use crate::error::Result;
use crate::reader::BinReader;

/// First four bytes of every binary manifest, little-endian.
pub const MANIFEST_MAGIC: u32 = 0x44BE_C00C;

/// Size of the header fields this version understands, magic included.
pub const HEADER_LEN: u32 = 41;

bitflags! {
    /// Storage mode of the manifest body.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
    pub struct StoredAs: u8 {
        const COMPRESSED = 0x01;
        const ENCRYPTED = 0x02;
    }
}

#[derive(Serialize, Clone, Debug)]
pub struct Header {
    pub magic: u32,
    /// Absolute offset of the body; may exceed [`HEADER_LEN`] for newer layouts.
    pub header_size: u32,
    pub data_size_uncompressed: u32,
    pub data_size_compressed: u32,
    /// SHA-1 of the uncompressed body.
    pub sha_hash: [u8; 20],
    pub stored_as: StoredAs,
    pub version: u32,
}

impl Header {
    /// Decode the fields that follow the magic. The caller has already
    /// consumed and validated the magic.
    pub fn read<R: Read + Seek>(r: &mut BinReader<R>) -> Result<Self> {
        let header_size = r.read_u32()?;
        let data_size_uncompressed = r.read_u32()?;
        let data_size_compressed = r.read_u32()?;
        let sha_hash = r.read_array::<20>()?;
        let stored_as = StoredAs::from_bits_retain(r.read_u8()?);
        let version = r.read_u32()?;
        Ok(Self {
            magic: MANIFEST_MAGIC,
            header_size,
            data_size_uncompressed,
            data_size_compressed,
            sha_hash,
            stored_as,
            version,
        })
    }

    pub fn is_compressed(&self) -> bool {
        self.stored_as.contains(StoredAs::COMPRESSED)
    }

    pub fn is_encrypted(&self) -> bool {
        self.stored_as.contains(StoredAs::ENCRYPTED)
    }

    pub fn sha_hex(&self) -> String {
        hex::encode(self.sha_hash)
    }
}
