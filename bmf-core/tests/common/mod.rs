#![allow(dead_code)]

use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::Write;
use uuid::Uuid;

pub const MAGIC: u32 = 0x44BE_C00C;

/// Little-endian byte sink mirroring the manifest wire format.
#[derive(Default)]
pub struct W {
    pub buf: Vec<u8>,
}

impl W {
    pub fn u8(&mut self, v: u8) -> &mut Self {
        self.buf.push(v);
        self
    }
    pub fn u32(&mut self, v: u32) -> &mut Self {
        self.buf.extend_from_slice(&v.to_le_bytes());
        self
    }
    pub fn u64(&mut self, v: u64) -> &mut Self {
        self.buf.extend_from_slice(&v.to_le_bytes());
        self
    }
    pub fn i64(&mut self, v: i64) -> &mut Self {
        self.buf.extend_from_slice(&v.to_le_bytes());
        self
    }
    pub fn bytes(&mut self, b: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(b);
        self
    }
    pub fn fstring(&mut self, s: &str) -> &mut Self {
        if s.is_empty() {
            return self.u32(0);
        }
        self.u32(s.len() as u32 + 1);
        self.bytes(s.as_bytes());
        self.u8(0)
    }
    pub fn fstring_array(&mut self, v: &[&str]) -> &mut Self {
        self.u32(v.len() as u32);
        for s in v {
            self.fstring(s);
        }
        self
    }
    pub fn guid(&mut self, words: [u32; 4]) -> &mut Self {
        for w in words {
            self.buf.extend_from_slice(&w.to_be_bytes());
        }
        self
    }
}

/// Identifier the decoder should produce for `words`.
pub fn guid(words: [u32; 4]) -> Uuid {
    let mut b = [0u8; 16];
    for (i, w) in words.iter().enumerate() {
        b[i * 4..i * 4 + 4].copy_from_slice(&w.to_le_bytes());
    }
    Uuid::from_bytes(b)
}

#[derive(Clone)]
pub struct ChunkSpec {
    pub words: [u32; 4],
    pub hash: u64,
    pub group: u8,
    pub window: u32,
    pub file_size: i64,
}

pub fn chunk(n: u32) -> ChunkSpec {
    ChunkSpec {
        words: [n, n.wrapping_mul(7), 0xA5A5_0000 | n, !n],
        hash: 0x1000 + n as u64,
        group: (n % 100) as u8,
        window: 1024 * 1024,
        file_size: 4096 + n as i64,
    }
}

#[derive(Clone)]
pub struct FileSpec {
    pub name: String,
    pub tags: Vec<String>,
    /// (chunk words, offset in chunk, size)
    pub parts: Vec<([u32; 4], u32, u32)>,
    pub flags: u8,
}

pub fn file(name: &str, tags: &[&str], parts: &[(&ChunkSpec, u32)]) -> FileSpec {
    FileSpec {
        name: name.to_string(),
        tags: tags.iter().map(|s| s.to_string()).collect(),
        parts: parts.iter().map(|(c, size)| (c.words, 0, *size)).collect(),
        flags: 0,
    }
}

pub struct ManifestBuilder {
    pub app_name: String,
    pub build_version: String,
    pub build_id: String,
    pub chunks: Vec<ChunkSpec>,
    pub files: Vec<FileSpec>,
    pub custom: Vec<(String, String)>,
    pub meta_version: u8,
    pub file_version: u8,
    pub compressed: bool,
    pub encrypted: bool,
    /// Extra header bytes this decoder does not know about.
    pub header_pad: usize,
    /// Extra trailing bytes appended to every block.
    pub block_pad: usize,
    /// Overrides the header's declared uncompressed size.
    pub declared_uncompressed: Option<u32>,
    /// Declared size of every chunk part record.
    pub part_size: u32,
}

impl Default for ManifestBuilder {
    fn default() -> Self {
        Self {
            app_name: "Fortress".into(),
            build_version: "1.0.0-CL-100".into(),
            build_id: "build-100".into(),
            chunks: vec![],
            files: vec![],
            custom: vec![],
            meta_version: 1,
            file_version: 0,
            compressed: false,
            encrypted: false,
            header_pad: 0,
            block_pad: 0,
            declared_uncompressed: None,
            part_size: 32,
        }
    }
}

fn block(version: u8, pad: usize, body: impl FnOnce(&mut W)) -> Vec<u8> {
    let mut w = W::default();
    w.u32(0).u8(version);
    body(&mut w);
    w.bytes(&vec![0xEE; pad]);
    let len = w.buf.len() as u32;
    w.buf[..4].copy_from_slice(&len.to_le_bytes());
    w.buf
}

impl ManifestBuilder {
    pub fn body(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend(block(self.meta_version, self.block_pad, |w| {
            w.u32(18).u8(1).u32(7);
            w.fstring(&self.app_name).fstring(&self.build_version);
            w.fstring("Game/Binaries/Game.exe").fstring("-nosplash");
            w.fstring_array(&["prereq-1"]);
            w.fstring("Redist").fstring("Redist/setup.exe").fstring("/quiet");
            if self.meta_version >= 1 {
                w.fstring(&self.build_id);
            }
            if self.meta_version >= 2 {
                w.fstring("Uninstall.exe").fstring("/silent");
            }
        }));
        out.extend(block(0, self.block_pad, |w| {
            w.u32(self.chunks.len() as u32);
            for c in &self.chunks {
                w.guid(c.words);
            }
            for c in &self.chunks {
                w.u64(c.hash);
            }
            for c in &self.chunks {
                w.bytes(&[c.group; 20]);
            }
            for c in &self.chunks {
                w.u8(c.group);
            }
            for c in &self.chunks {
                w.u32(c.window);
            }
            for c in &self.chunks {
                w.i64(c.file_size);
            }
        }));
        out.extend(block(self.file_version, self.block_pad, |w| {
            w.u32(self.files.len() as u32);
            for f in &self.files {
                w.fstring(&f.name);
            }
            for _ in &self.files {
                w.fstring("");
            }
            for (i, _) in self.files.iter().enumerate() {
                w.bytes(&[i as u8; 20]);
            }
            for f in &self.files {
                w.u8(f.flags);
            }
            for f in &self.files {
                let tags: Vec<&str> = f.tags.iter().map(|s| s.as_str()).collect();
                w.fstring_array(&tags);
            }
            for f in &self.files {
                w.u32(f.parts.len() as u32);
                for (words, offset, size) in &f.parts {
                    // 28 bytes of known fields, then padding up to part_size
                    w.u32(self.part_size).guid(*words).u32(*offset).u32(*size);
                    w.bytes(&vec![0xDE; self.part_size.saturating_sub(28) as usize]);
                }
            }
            if self.file_version >= 1 {
                for (i, _) in self.files.iter().enumerate() {
                    if i % 2 == 0 {
                        w.u32(1).bytes(&[0x5D; 16]);
                    } else {
                        w.u32(0);
                    }
                }
                for _ in &self.files {
                    w.fstring("application/octet-stream");
                }
            }
            if self.file_version >= 2 {
                for _ in &self.files {
                    w.bytes(&[0x26; 32]);
                }
            }
        }));
        out.extend(block(0, self.block_pad, |w| {
            w.u32(self.custom.len() as u32);
            for (k, _) in &self.custom {
                w.fstring(k);
            }
            for (_, v) in &self.custom {
                w.fstring(v);
            }
        }));
        out
    }

    pub fn build(&self) -> Vec<u8> {
        let raw = self.body();
        let stored = if self.compressed {
            let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
            enc.write_all(&raw).unwrap();
            enc.finish().unwrap()
        } else {
            raw.clone()
        };
        let mut stored_as = 0u8;
        if self.compressed {
            stored_as |= 0x01;
        }
        if self.encrypted {
            stored_as |= 0x02;
        }
        let mut w = W::default();
        w.u32(MAGIC)
            .u32(41 + self.header_pad as u32)
            .u32(self.declared_uncompressed.unwrap_or(raw.len() as u32))
            .u32(stored.len() as u32)
            .bytes(&[0xAB; 20])
            .u8(stored_as)
            .u32(18)
            .bytes(&vec![0xCD; self.header_pad])
            .bytes(&stored);
        w.buf
    }
}

/// Base fixture: files A and B over chunks X and Y.
pub fn base_builder() -> ManifestBuilder {
    let (x, y) = (chunk(1), chunk(2));
    ManifestBuilder {
        chunks: vec![x.clone(), y.clone()],
        files: vec![
            file("Game/A.pak", &["core"], &[(&x, 100)]),
            file("Game/B.pak", &["core"], &[(&y, 200), (&x, 50)]),
        ],
        custom: vec![("BuildLabel".into(), "Live".into()), ("CloudDir".into(), "/cdn".into())],
        ..Default::default()
    }
}

/// Delta fixture: modified B' and new C over chunks Y and Z.
pub fn delta_builder() -> ManifestBuilder {
    let (y, z) = (chunk(2), chunk(3));
    ManifestBuilder {
        build_version: "1.0.1-CL-101".into(),
        build_id: "build-101".into(),
        chunks: vec![y.clone(), z.clone()],
        files: vec![
            file("Game/B.pak", &["core", "patch"], &[(&z, 300)]),
            file("Game/C.pak", &["de_DE"], &[(&y, 10)]),
        ],
        ..Default::default()
    }
}
