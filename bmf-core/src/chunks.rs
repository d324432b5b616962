use serde::Serialize;
use std::collections::HashMap;
use std::io::{Read, Seek};
use uuid::Uuid;

use crate::block::{Block, BlockInfo, PREALLOC};
use crate::error::Result;
use crate::reader::BinReader;

/// One content-addressed chunk.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Chunk {
    pub guid: Uuid,
    /// Rolling hash of the chunk data.
    pub hash: u64,
    pub sha_hash: [u8; 20],
    pub group_number: u8,
    /// Uncompressed size of the chunk.
    pub window_size: u32,
    /// Size of the chunk file as stored.
    pub file_size: i64,
}

impl Chunk {
    pub fn sha_hex(&self) -> String {
        hex::encode(self.sha_hash)
    }
}

/// Chunk table with an identifier index. Rows and index only change together
/// through [`ChunkDataList::push`].
#[derive(Serialize, Clone, Debug, Default)]
pub struct ChunkDataList {
    pub info: BlockInfo,
    chunks: Vec<Chunk>,
    #[serde(skip)]
    lookup: HashMap<Uuid, usize>,
}

impl ChunkDataList {
    pub fn new(info: BlockInfo) -> Self {
        Self { info, ..Default::default() }
    }

    /// Append `chunk` unless its identifier is already present.
    /// Returns whether it was added.
    pub fn push(&mut self, chunk: Chunk) -> bool {
        if self.lookup.contains_key(&chunk.guid) {
            return false;
        }
        self.lookup.insert(chunk.guid, self.chunks.len());
        self.chunks.push(chunk);
        true
    }

    pub fn get(&self, guid: &Uuid) -> Option<&Chunk> {
        self.lookup.get(guid).map(|&i| &self.chunks[i])
    }

    pub fn contains(&self, guid: &Uuid) -> bool {
        self.lookup.contains_key(guid)
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Chunk> {
        self.chunks.iter()
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn count(&self) -> u32 {
        self.chunks.len() as u32
    }

    /// Sum of stored chunk sizes.
    pub fn download_size(&self) -> u64 {
        self.chunks.iter().map(|c| c.file_size.max(0) as u64).sum()
    }
}

impl FromIterator<Chunk> for ChunkDataList {
    fn from_iter<I: IntoIterator<Item = Chunk>>(iter: I) -> Self {
        let mut list = ChunkDataList::default();
        for c in iter {
            list.push(c);
        }
        list
    }
}

impl Block for ChunkDataList {
    const NAME: &'static str = "chunk list";

    // Stored column by column: every GUID, then every hash, and so on.
    fn read_from<R: Read + Seek>(r: &mut BinReader<R>) -> Result<Self> {
        let info = BlockInfo::read(r)?;
        let count = r.read_count("chunk count")?;

        let mut guids = Vec::with_capacity(count.min(PREALLOC));
        for _ in 0..count {
            guids.push(r.read_guid()?);
        }
        let mut hashes = Vec::with_capacity(count.min(PREALLOC));
        for _ in 0..count {
            hashes.push(r.read_u64()?);
        }
        let mut shas = Vec::with_capacity(count.min(PREALLOC));
        for _ in 0..count {
            shas.push(r.read_array::<20>()?);
        }
        let mut groups = Vec::with_capacity(count.min(PREALLOC));
        for _ in 0..count {
            groups.push(r.read_u8()?);
        }
        let mut windows = Vec::with_capacity(count.min(PREALLOC));
        for _ in 0..count {
            windows.push(r.read_u32()?);
        }
        let mut sizes = Vec::with_capacity(count.min(PREALLOC));
        for _ in 0..count {
            sizes.push(r.read_i64()?);
        }

        let mut list = ChunkDataList::new(info);
        for i in 0..count {
            let chunk = Chunk {
                guid: guids[i],
                hash: hashes[i],
                sha_hash: shas[i],
                group_number: groups[i],
                window_size: windows[i],
                file_size: sizes[i],
            };
            if !list.push(chunk) {
                log::warn!("duplicate chunk {} dropped", guids[i]);
            }
        }
        log::debug!("chunk list: v{} {} chunks", info.data_version, list.len());
        Ok(list)
    }

    fn info(&self) -> BlockInfo {
        self.info
    }
}
