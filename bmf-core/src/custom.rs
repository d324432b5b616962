use serde::Serialize;
use std::io::{Read, Seek};

use crate::block::{Block, BlockInfo, PREALLOC};
use crate::error::Result;
use crate::reader::BinReader;

/// Free-form key/value metadata, in stream order.
#[derive(Serialize, Clone, Debug, Default)]
pub struct CustomFields {
    pub info: BlockInfo,
    pub fields: Vec<(String, String)>,
}

impl CustomFields {
    /// First value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Block for CustomFields {
    const NAME: &'static str = "custom fields";

    // All keys come first, then all values.
    fn read_from<R: Read + Seek>(r: &mut BinReader<R>) -> Result<Self> {
        let info = BlockInfo::read(r)?;
        let count = r.read_count("custom field count")?;
        let mut keys = Vec::with_capacity(count.min(PREALLOC));
        for _ in 0..count {
            keys.push(r.read_fstring()?);
        }
        let mut fields = Vec::with_capacity(keys.len());
        for key in keys {
            fields.push((key, r.read_fstring()?));
        }
        Ok(Self { info, fields })
    }

    fn info(&self) -> BlockInfo {
        self.info
    }
}
