use std::io::{ErrorKind, Read, Seek, SeekFrom};

use uuid::Uuid;

use crate::error::{ManifestError, Result};

/// Byte order used for fixed-width reads.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

/// Primitive reader over a seekable byte source.
///
/// Every fixed-width read consumes exactly its width or fails; partial reads
/// are reported as [`ManifestError::ShortRead`]. The cursor is shared mutable
/// state, so `peek` must not race another reader over the same stream.
pub struct BinReader<R> {
    inner: R,
    order: Endian,
    max_entries: usize,
}

macro_rules! read_fixed {
    ($name:ident, $ty:ty, $n:literal) => {
        pub fn $name(&mut self) -> Result<$ty> {
            let b = self.read_array::<$n>()?;
            Ok(match self.order {
                Endian::Little => <$ty>::from_le_bytes(b),
                Endian::Big => <$ty>::from_be_bytes(b),
            })
        }
    };
}

impl<R: Read + Seek> BinReader<R> {
    pub fn new(inner: R, order: Endian) -> Self {
        Self { inner, order, max_entries: usize::MAX }
    }

    /// Cap on element counts accepted by `read_fstring_array`.
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    pub fn order(&self) -> Endian {
        self.order
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    pub fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        Ok(self.inner.seek(pos)?)
    }

    pub fn position(&mut self) -> Result<u64> {
        Ok(self.inner.stream_position()?)
    }

    /// Read everything left in the stream.
    pub fn read_all(&mut self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.inner.read_to_end(&mut out)?;
        Ok(out)
    }

    /// Read exactly `count` bytes. Growth is bounded by what the stream
    /// actually yields, so a corrupt length cannot force a huge allocation.
    pub fn read_bytes(&mut self, count: i64) -> Result<Vec<u8>> {
        if count < 0 {
            return Err(ManifestError::NegativeLength(count));
        }
        if count == 0 {
            return Ok(Vec::new());
        }
        let mut out = Vec::with_capacity((count as usize).min(64 * 1024));
        (&mut self.inner).take(count as u64).read_to_end(&mut out)?;
        if (out.len() as u64) < count as u64 {
            return Err(ManifestError::ShortRead { wanted: count as usize, got: out.len() });
        }
        Ok(out)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut b = [0u8; N];
        let mut got = 0usize;
        while got < N {
            match self.inner.read(&mut b[got..]) {
                Ok(0) => return Err(ManifestError::ShortRead { wanted: N, got }),
                Ok(n) => got += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(b)
    }

    /// Read `n` bytes and rewind by exactly that amount.
    pub fn peek(&mut self, n: i64) -> Result<Vec<u8>> {
        let b = self.read_bytes(n)?;
        self.inner.seek(SeekFrom::Current(-(b.len() as i64)))?;
        Ok(b)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.read_u8()? as i8)
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    read_fixed!(read_u16, u16, 2);
    read_fixed!(read_i16, i16, 2);
    read_fixed!(read_u32, u32, 4);
    read_fixed!(read_i32, i32, 4);
    read_fixed!(read_u64, u64, 8);
    read_fixed!(read_i64, i64, 8);

    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(f32::from_bits(self.read_u32()?))
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        Ok(f64::from_bits(self.read_u64()?))
    }

    /// Length-prefixed, null-terminated string. A zero length yields `""`
    /// after consuming only the prefix.
    pub fn read_fstring(&mut self) -> Result<String> {
        let len = self.read_u32()?;
        if len == 0 {
            return Ok(String::new());
        }
        let buf = self.read_bytes(len as i64)?;
        let Some((&0, body)) = buf.split_last() else {
            return Err(ManifestError::UnterminatedString { len });
        };
        Ok(String::from_utf8_lossy(body).into_owned())
    }

    pub fn read_fstring_array(&mut self) -> Result<Vec<String>> {
        let count = self.read_count("string array")?;
        let mut out = Vec::with_capacity(count.min(1024));
        for _ in 0..count {
            out.push(self.read_fstring()?);
        }
        Ok(out)
    }

    /// GUID stored as four big-endian u32 words, whatever the reader's order.
    pub fn read_guid(&mut self) -> Result<Uuid> {
        let mut words = [0u32; 4];
        for w in &mut words {
            *w = u32::from_be_bytes(self.read_array::<4>()?);
        }
        Ok(Uuid::from_bytes(repack_guid(words)))
    }

    /// u32 element count, checked against the configured entry cap.
    pub fn read_count(&mut self, what: &'static str) -> Result<usize> {
        let count = self.read_u32()?;
        if count as u64 > self.max_entries as u64 {
            return Err(ManifestError::LimitExceeded {
                what,
                value: count as u64,
                limit: self.max_entries as u64,
            });
        }
        Ok(count as usize)
    }
}

impl<R: Read> Read for BinReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.inner.read(buf)
    }
}

/// Store each word little-endian in its own 4-byte slot. Word order is kept;
/// only the bytes inside each word flip relative to the big-endian source.
pub fn repack_guid(words: [u32; 4]) -> [u8; 16] {
    let mut out = [0u8; 16];
    for (slot, w) in out.chunks_exact_mut(4).zip(words) {
        slot.copy_from_slice(&w.to_le_bytes());
    }
    out
}
