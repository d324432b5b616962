use bitflags::bitflags;
use serde::Serialize;
use std::io::{Read, Seek, SeekFrom};
use uuid::Uuid;

use crate::block::{Block, BlockInfo, PREALLOC};
use crate::chunks::ChunkDataList;
use crate::error::{ManifestError, Result};
use crate::reader::BinReader;

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
    pub struct FileMetaFlags: u8 {
        const READ_ONLY = 0x01;
        const COMPRESSED = 0x02;
        const UNIX_EXECUTABLE = 0x04;
    }
}

/// A slice of one chunk placed into a file.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct ChunkPart {
    pub guid: Uuid,
    /// Offset within the chunk.
    pub offset: u32,
    pub size: u32,
    /// Offset within the reconstructed file.
    pub file_offset: u64,
}

#[derive(Serialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct FileManifest {
    pub filename: String,
    pub symlink_target: String,
    pub hash: [u8; 20],
    pub flags: FileMetaFlags,
    pub install_tags: Vec<String>,
    pub chunk_parts: Vec<ChunkPart>,
    pub md5: Option<[u8; 16]>,
    pub mime_type: String,
    pub sha256: Option<[u8; 32]>,
    pub file_size: u64,
}

impl FileManifest {
    pub fn hash_hex(&self) -> String {
        hex::encode(self.hash)
    }

    pub fn is_executable(&self) -> bool {
        self.flags.contains(FileMetaFlags::UNIX_EXECUTABLE)
    }
}

#[derive(Serialize, Clone, Debug, Default)]
pub struct FileManifestList {
    pub info: BlockInfo,
    pub files: Vec<FileManifest>,
}

impl FileManifestList {
    pub fn count(&self) -> u32 {
        self.files.len() as u32
    }

    /// First file with exactly this path.
    pub fn get_by_path(&self, path: &str) -> Option<&FileManifest> {
        self.files.iter().find(|f| f.filename == path)
    }

    /// Sum of reconstructed file sizes.
    pub fn total_size(&self) -> u64 {
        self.files.iter().map(|f| f.file_size).sum()
    }

    /// Resolve every chunk part against `chunks`. Unresolved parts are
    /// logged and kept; returns how many there were.
    pub fn resolve_parts(&self, chunks: &ChunkDataList) -> usize {
        let dangling = self.unresolved_parts(chunks).count();
        if dangling > 0 {
            log::warn!("{} chunk parts reference chunks missing from the chunk list", dangling);
        }
        dangling
    }

    /// Parts whose chunk is absent from `chunks`, paired with their file.
    pub fn unresolved_parts<'a>(
        &'a self,
        chunks: &'a ChunkDataList,
    ) -> impl Iterator<Item = (&'a FileManifest, &'a ChunkPart)> + 'a {
        self.files.iter().flat_map(move |f| {
            f.chunk_parts.iter().filter(move |p| !chunks.contains(&p.guid)).map(move |p| (f, p))
        })
    }
}

fn read_chunk_part<R: Read + Seek>(r: &mut BinReader<R>, file_offset: u64) -> Result<ChunkPart> {
    let start = r.position()?;
    let data_size = r.read_u32()?;
    let part = ChunkPart {
        guid: r.read_guid()?,
        offset: r.read_u32()?,
        size: r.read_u32()?,
        file_offset,
    };
    let consumed = r.position()? - start;
    if (data_size as u64) < consumed {
        return Err(ManifestError::RecordTooSmall { what: "chunk part", declared: data_size, consumed });
    }
    r.seek(SeekFrom::Start(start + data_size as u64))?;
    Ok(part)
}

/// Visit one field of every file. The first column creates the rows, so a
/// bogus count fails on the stream before it can allocate.
fn column<R, F>(
    r: &mut BinReader<R>,
    files: &mut Vec<FileManifest>,
    count: usize,
    mut read: F,
) -> Result<()>
where
    R: Read + Seek,
    F: FnMut(&mut BinReader<R>, &mut FileManifest) -> Result<()>,
{
    for i in 0..count {
        if i == files.len() {
            files.push(FileManifest::default());
        }
        read(r, &mut files[i])?;
    }
    Ok(())
}

impl Block for FileManifestList {
    const NAME: &'static str = "file list";

    fn read_from<R: Read + Seek>(r: &mut BinReader<R>) -> Result<Self> {
        let info = BlockInfo::read(r)?;
        let count = r.read_count("file count")?;
        let mut files: Vec<FileManifest> = Vec::with_capacity(count.min(PREALLOC));

        column(r, &mut files, count, |r, f| {
            f.filename = r.read_fstring()?;
            Ok(())
        })?;
        column(r, &mut files, count, |r, f| {
            f.symlink_target = r.read_fstring()?;
            Ok(())
        })?;
        column(r, &mut files, count, |r, f| {
            f.hash = r.read_array::<20>()?;
            Ok(())
        })?;
        column(r, &mut files, count, |r, f| {
            f.flags = FileMetaFlags::from_bits_retain(r.read_u8()?);
            Ok(())
        })?;
        column(r, &mut files, count, |r, f| {
            f.install_tags = r.read_fstring_array()?;
            Ok(())
        })?;
        column(r, &mut files, count, |r, f| {
            let parts = r.read_count("chunk part count")?;
            let mut file_offset = 0u64;
            f.chunk_parts = Vec::with_capacity(parts.min(PREALLOC));
            for _ in 0..parts {
                let part = read_chunk_part(r, file_offset)?;
                file_offset += part.size as u64;
                f.chunk_parts.push(part);
            }
            f.file_size = file_offset;
            Ok(())
        })?;
        if info.data_version >= 1 {
            column(r, &mut files, count, |r, f| {
                if r.read_u32()? != 0 {
                    f.md5 = Some(r.read_array::<16>()?);
                }
                Ok(())
            })?;
            column(r, &mut files, count, |r, f| {
                f.mime_type = r.read_fstring()?;
                Ok(())
            })?;
        }
        if info.data_version >= 2 {
            column(r, &mut files, count, |r, f| {
                f.sha256 = Some(r.read_array::<32>()?);
                Ok(())
            })?;
        }

        log::debug!("file list: v{} {} files", info.data_version, files.len());
        Ok(Self { info, files })
    }

    fn info(&self) -> BlockInfo {
        self.info
    }
}
