use serde::Serialize;
use std::io::{Read, Seek};

use crate::block::{Block, BlockInfo};
use crate::error::Result;
use crate::reader::BinReader;

/// Build-identifying metadata.
#[derive(Serialize, Clone, Debug, Default)]
pub struct ManifestMeta {
    pub info: BlockInfo,
    pub feature_level: u32,
    pub is_file_data: bool,
    pub app_id: u32,
    pub app_name: String,
    pub build_version: String,
    pub launch_exe: String,
    pub launch_command: String,
    pub prereq_ids: Vec<String>,
    pub prereq_name: String,
    pub prereq_path: String,
    pub prereq_args: String,
    /// Present from data version 1.
    pub build_id: String,
    /// Present from data version 2.
    pub uninstall_action_path: String,
    pub uninstall_action_args: String,
}

impl Block for ManifestMeta {
    const NAME: &'static str = "meta";

    fn read_from<R: Read + Seek>(r: &mut BinReader<R>) -> Result<Self> {
        let info = BlockInfo::read(r)?;
        let mut meta = ManifestMeta {
            info,
            feature_level: r.read_u32()?,
            is_file_data: r.read_bool()?,
            app_id: r.read_u32()?,
            app_name: r.read_fstring()?,
            build_version: r.read_fstring()?,
            launch_exe: r.read_fstring()?,
            launch_command: r.read_fstring()?,
            prereq_ids: r.read_fstring_array()?,
            prereq_name: r.read_fstring()?,
            prereq_path: r.read_fstring()?,
            prereq_args: r.read_fstring()?,
            ..Default::default()
        };
        if info.data_version >= 1 {
            meta.build_id = r.read_fstring()?;
        }
        if info.data_version >= 2 {
            meta.uninstall_action_path = r.read_fstring()?;
            meta.uninstall_action_args = r.read_fstring()?;
        }
        Ok(meta)
    }

    fn info(&self) -> BlockInfo {
        self.info
    }
}
