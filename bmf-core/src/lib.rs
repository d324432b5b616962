pub mod block;
pub mod body;
pub mod chunks;
pub mod custom;
pub mod delta;
pub mod error;
pub mod files;
pub mod filter;
pub mod header;
pub mod manifest;
pub mod meta;
pub mod reader;
pub mod source;

pub use body::DecodeLimits;
pub use delta::{merge, MergeStats};
pub use error::{ManifestError, Result};
pub use manifest::Manifest;
