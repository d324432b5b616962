use thiserror::Error;

use crate::header::MANIFEST_MAGIC;

/// Errors produced while decoding a binary manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("bad magic 0x{found:08X}, must be 0x{:08X}", MANIFEST_MAGIC)]
    BadMagic { found: u32 },
    #[error("short read: wanted {wanted} bytes, got {got}")]
    ShortRead { wanted: usize, got: usize },
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("negative byte count: {0}")]
    NegativeLength(i64),
    #[error("string of {len} bytes is not null terminated")]
    UnterminatedString { len: u32 },
    #[error("decompressed data size mismatch: header declares {expected} bytes, got {actual}")]
    SizeMismatch { expected: u64, actual: u64 },
    #[error("manifest body is encrypted, which is not supported")]
    UnsupportedEncryption,
    #[error("failed to inflate manifest body: {0}")]
    Decompression(#[source] std::io::Error),
    #[error("{what} declares {declared} bytes but its fields take {consumed}")]
    RecordTooSmall { what: &'static str, declared: u32, consumed: u64 },
    #[error("{what} exceeds limit: {value} > {limit}")]
    LimitExceeded { what: &'static str, value: u64, limit: u64 },
}

pub type Result<T> = std::result::Result<T, ManifestError>;
