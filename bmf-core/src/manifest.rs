use serde::Serialize;
use std::io::{Cursor, Read, Seek, SeekFrom};

use crate::block::decode_block;
use crate::body::{open_body, DecodeLimits};
use crate::chunks::ChunkDataList;
use crate::custom::CustomFields;
use crate::error::{ManifestError, Result};
use crate::files::FileManifestList;
use crate::header::{Header, MANIFEST_MAGIC};
use crate::meta::ManifestMeta;
use crate::reader::{BinReader, Endian};

/// A fully decoded binary manifest.
#[derive(Serialize, Clone, Debug)]
pub struct Manifest {
    pub header: Header,
    pub meta: ManifestMeta,
    pub chunks: ChunkDataList,
    pub files: FileManifestList,
    pub custom_fields: CustomFields,
}

impl Manifest {
    pub fn decode<R: Read + Seek>(src: R) -> Result<Self> {
        Self::decode_with_limits(src, &DecodeLimits::default())
    }

    /// Decode header, body envelope and the four body blocks in order.
    /// Nothing is returned unless every block decoded.
    pub fn decode_with_limits<R: Read + Seek>(src: R, limits: &DecodeLimits) -> Result<Self> {
        let mut r = BinReader::new(src, Endian::Little).with_max_entries(limits.max_entries);
        let magic = r.read_u32()?;
        if magic != MANIFEST_MAGIC {
            return Err(ManifestError::BadMagic { found: magic });
        }
        let header = Header::read(&mut r)?;
        log::debug!(
            "header: size={} version={} stored_as={:?}",
            header.header_size,
            header.version,
            header.stored_as
        );
        r.seek(SeekFrom::Start(header.header_size as u64))?;

        match open_body(&mut r, &header, limits)? {
            Some(body) => {
                let mut br = BinReader::new(body, Endian::Little).with_max_entries(limits.max_entries);
                Self::decode_body(header, &mut br)
            }
            None => Self::decode_body(header, &mut r),
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::decode(Cursor::new(bytes))
    }

    // The chunk list must precede the file list so parts can be resolved.
    fn decode_body<R: Read + Seek>(header: Header, r: &mut BinReader<R>) -> Result<Self> {
        let meta: ManifestMeta = decode_block(r)?;
        let chunks: ChunkDataList = decode_block(r)?;
        let files: FileManifestList = decode_block(r)?;
        let dangling = files.resolve_parts(&chunks);
        let custom_fields: CustomFields = decode_block(r)?;
        log::debug!(
            "body: {} chunks, {} files, {} unresolved parts, {} custom fields",
            chunks.len(),
            files.files.len(),
            dangling,
            custom_fields.len()
        );
        Ok(Self { header, meta, chunks, files, custom_fields })
    }

    pub fn build_version(&self) -> &str {
        &self.meta.build_version
    }

    pub fn file_count(&self) -> u32 {
        self.files.count()
    }

    pub fn chunk_count(&self) -> u32 {
        self.chunks.count()
    }
}
